use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::models::{Department, DepartmentInput};

#[derive(Clone)]
pub struct DepartmentRepository {
    pool: SqlitePool,
}

impl DepartmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: &DepartmentInput) -> Result<Department, sqlx::Error> {
        let now = Utc::now();

        sqlx::query_as::<_, Department>(
            r#"
            INSERT INTO
                departments (id, name, description, manager_id, created_at, updated_at)
            VALUES
                (?, ?, ?, ?, ?, ?)
            RETURNING
                id,
                name,
                description,
                manager_id,
                created_at,
                updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.manager_id)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Department>, sqlx::Error> {
        sqlx::query_as::<_, Department>(
            r#"
            SELECT
                id,
                name,
                description,
                manager_id,
                created_at,
                updated_at
            FROM
                departments
            WHERE
                id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn name_exists(&self, name: &str) -> Result<bool, sqlx::Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM departments WHERE name = ?")
            .bind(name.trim())
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    pub async fn list(&self) -> Result<Vec<Department>, sqlx::Error> {
        sqlx::query_as::<_, Department>(
            r#"
            SELECT
                id,
                name,
                description,
                manager_id,
                created_at,
                updated_at
            FROM
                departments
            ORDER BY
                name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn set_manager(
        &self,
        id: Uuid,
        manager_id: Option<Uuid>,
    ) -> Result<Option<Department>, sqlx::Error> {
        sqlx::query_as::<_, Department>(
            r#"
            UPDATE
                departments
            SET
                manager_id = ?,
                updated_at = ?
            WHERE
                id = ?
            RETURNING
                id,
                name,
                description,
                manager_id,
                created_at,
                updated_at
            "#,
        )
        .bind(manager_id)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }
}
