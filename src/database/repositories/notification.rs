use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::models::{Notification, NotificationContext};

#[derive(Clone)]
pub struct NotificationRepository {
    pool: SqlitePool,
}

impl NotificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        context: &NotificationContext,
        title: &str,
        message: &str,
    ) -> Result<Notification, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO
                notifications (
                    id,
                    recipient_id,
                    notification_type,
                    reference_type,
                    reference_id,
                    title,
                    message,
                    is_read,
                    created_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?, 0, ?)
            RETURNING
                id,
                recipient_id,
                notification_type,
                reference_type,
                reference_id,
                title,
                message,
                is_read,
                read_at,
                created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(context.recipient_id)
        .bind(context.notification_type)
        .bind(context.reference_type)
        .bind(context.reference_id)
        .bind(title)
        .bind(message)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Notification>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            SELECT
                id,
                recipient_id,
                notification_type,
                reference_type,
                reference_id,
                title,
                message,
                is_read,
                read_at,
                created_at
            FROM
                notifications
            WHERE
                id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn list_for_recipient(
        &self,
        recipient_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            SELECT
                id,
                recipient_id,
                notification_type,
                reference_type,
                reference_id,
                title,
                message,
                is_read,
                read_at,
                created_at
            FROM
                notifications
            WHERE
                recipient_id = ?
            ORDER BY
                created_at DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(recipient_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn count_unread(&self, recipient_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = ? AND is_read = 0",
        )
        .bind(recipient_id)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn mark_as_read(&self, id: Uuid) -> Result<Option<Notification>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            UPDATE
                notifications
            SET
                is_read = 1,
                read_at = COALESCE(read_at, ?)
            WHERE
                id = ?
            RETURNING
                id,
                recipient_id,
                notification_type,
                reference_type,
                reference_id,
                title,
                message,
                is_read,
                read_at,
                created_at
            "#,
        )
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn mark_all_as_read(&self, recipient_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = 1, read_at = ? WHERE recipient_id = ? AND is_read = 0",
        )
        .bind(Utc::now())
        .bind(recipient_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
