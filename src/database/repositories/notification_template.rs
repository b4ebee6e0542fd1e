use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::models::{
    NotificationTemplate, NotificationTemplateInput, NotificationType, Role,
};

#[derive(Clone)]
pub struct NotificationTemplateRepository {
    pool: SqlitePool,
}

impl NotificationTemplateRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Active template for exactly (type, role); `role = None` selects the fallback row.
    pub async fn find_active(
        &self,
        notification_type: NotificationType,
        role: Option<Role>,
    ) -> Result<Option<NotificationTemplate>, sqlx::Error> {
        sqlx::query_as::<_, NotificationTemplate>(
            r#"
            SELECT
                id,
                notification_type,
                role,
                title_template,
                message_template,
                is_active,
                created_at,
                updated_at
            FROM
                notification_templates
            WHERE
                notification_type = ?
                AND role IS ?
                AND is_active = 1
            ORDER BY
                updated_at DESC
            LIMIT 1
            "#,
        )
        .bind(notification_type)
        .bind(role)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn list(&self) -> Result<Vec<NotificationTemplate>, sqlx::Error> {
        sqlx::query_as::<_, NotificationTemplate>(
            r#"
            SELECT
                id,
                notification_type,
                role,
                title_template,
                message_template,
                is_active,
                created_at,
                updated_at
            FROM
                notification_templates
            ORDER BY
                notification_type ASC,
                role ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    /// Replace the template for (type, role), creating it when missing.
    pub async fn upsert(
        &self,
        input: &NotificationTemplateInput,
    ) -> Result<NotificationTemplate, sqlx::Error> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, NotificationTemplate>(
            r#"
            UPDATE
                notification_templates
            SET
                title_template = ?,
                message_template = ?,
                is_active = ?,
                updated_at = ?
            WHERE
                notification_type = ?
                AND role IS ?
            RETURNING
                id,
                notification_type,
                role,
                title_template,
                message_template,
                is_active,
                created_at,
                updated_at
            "#,
        )
        .bind(&input.title_template)
        .bind(&input.message_template)
        .bind(input.is_active)
        .bind(now)
        .bind(input.notification_type)
        .bind(input.role)
        .fetch_all(&mut *tx)
        .await?;

        let template = match updated.into_iter().next() {
            Some(template) => template,
            None => {
                sqlx::query_as::<_, NotificationTemplate>(
                    r#"
                    INSERT INTO
                        notification_templates (
                            id,
                            notification_type,
                            role,
                            title_template,
                            message_template,
                            is_active,
                            created_at,
                            updated_at
                        )
                    VALUES
                        (?, ?, ?, ?, ?, ?, ?, ?)
                    RETURNING
                        id,
                        notification_type,
                        role,
                        title_template,
                        message_template,
                        is_active,
                        created_at,
                        updated_at
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(input.notification_type)
                .bind(input.role)
                .bind(&input.title_template)
                .bind(&input.message_template)
                .bind(input.is_active)
                .bind(now)
                .bind(now)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;

        Ok(template)
    }
}
