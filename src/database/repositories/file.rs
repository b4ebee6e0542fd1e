use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::models::StoredFile;

#[derive(Clone)]
pub struct FileRepository {
    pool: SqlitePool,
}

impl FileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        owner_id: Uuid,
        original_name: &str,
        content_type: &str,
        size_bytes: i64,
        storage_key: &str,
    ) -> Result<StoredFile, sqlx::Error> {
        sqlx::query_as::<_, StoredFile>(
            r#"
            INSERT INTO
                stored_files (
                    id,
                    owner_id,
                    original_name,
                    content_type,
                    size_bytes,
                    storage_key,
                    created_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?)
            RETURNING
                id,
                owner_id,
                original_name,
                content_type,
                size_bytes,
                storage_key,
                created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(original_name)
        .bind(content_type)
        .bind(size_bytes)
        .bind(storage_key)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<StoredFile>, sqlx::Error> {
        sqlx::query_as::<_, StoredFile>(
            r#"
            SELECT
                id,
                owner_id,
                original_name,
                content_type,
                size_bytes,
                storage_key,
                created_at
            FROM
                stored_files
            WHERE
                id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }
}
