use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::models::{UpdateProfileInput, User};

#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_user(&self, user: &User) -> Result<User, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO
                users (
                    id,
                    email,
                    password_hash,
                    full_name,
                    role,
                    department_id,
                    phone,
                    position,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING
                id,
                email,
                password_hash,
                full_name,
                role,
                department_id,
                phone,
                position,
                created_at,
                updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(user.role)
        .bind(user.department_id)
        .bind(&user.phone)
        .bind(&user.position)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT
                id,
                email,
                password_hash,
                full_name,
                role,
                department_id,
                phone,
                position,
                created_at,
                updated_at
            FROM
                users
            WHERE
                email = ?
            "#,
        )
        .bind(email.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT
                id,
                email,
                password_hash,
                full_name,
                role,
                department_id,
                phone,
                position,
                created_at,
                updated_at
            FROM
                users
            WHERE
                id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// List users, optionally restricted to one department
    pub async fn list_users(&self, department_id: Option<Uuid>) -> Result<Vec<User>, sqlx::Error> {
        let mut query = r#"
            SELECT
                id,
                email,
                password_hash,
                full_name,
                role,
                department_id,
                phone,
                position,
                created_at,
                updated_at
            FROM
                users
            "#
        .to_string();

        if department_id.is_some() {
            query.push_str(" WHERE department_id = ?");
        }
        query.push_str(" ORDER BY full_name ASC");

        let mut prepared = sqlx::query_as::<_, User>(&query);
        if let Some(department_id) = department_id {
            prepared = prepared.bind(department_id);
        }

        prepared.fetch_all(&self.pool).await
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, sqlx::Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email.trim().to_lowercase())
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    pub async fn update_profile(
        &self,
        id: Uuid,
        input: &UpdateProfileInput,
    ) -> Result<Option<User>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE
                users
            SET
                full_name = COALESCE(?, full_name),
                phone = COALESCE(?, phone),
                position = COALESCE(?, position),
                updated_at = ?
            WHERE
                id = ?
            RETURNING
                id,
                email,
                password_hash,
                full_name,
                role,
                department_id,
                phone,
                position,
                created_at,
                updated_at
            "#,
        )
        .bind(input.full_name.as_deref().map(str::trim))
        .bind(&input.phone)
        .bind(&input.position)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn update_department(
        &self,
        id: Uuid,
        department_id: Option<Uuid>,
    ) -> Result<Option<User>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE
                users
            SET
                department_id = ?,
                updated_at = ?
            WHERE
                id = ?
            RETURNING
                id,
                email,
                password_hash,
                full_name,
                role,
                department_id,
                phone,
                position,
                created_at,
                updated_at
            "#,
        )
        .bind(department_id)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(password_hash)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
