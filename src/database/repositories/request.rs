use chrono::{NaiveDate, NaiveTime, Utc};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use uuid::Uuid;

use crate::database::models::{DayPeriod, Request, RequestStatus, RequestType};

/// Fields for a new pending request, already validated by the workflow.
#[derive(Debug, Clone)]
pub struct NewRequest {
    pub employee_id: Uuid,
    pub processor_id: Uuid,
    pub request_type: RequestType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub leave_period: Option<DayPeriod>,
    pub requested_time: Option<NaiveTime>,
    pub reason: Option<String>,
}

#[derive(Clone)]
pub struct RequestRepository {
    pool: SqlitePool,
}

impl RequestRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Takes the write lock up front so a racing decision waits on the busy
    /// timeout instead of failing a read-to-write upgrade.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
        self.pool.begin_with("BEGIN IMMEDIATE").await
    }

    pub async fn create_request(&self, input: NewRequest) -> Result<Request, sqlx::Error> {
        let now = Utc::now();

        sqlx::query_as::<_, Request>(
            r#"
            INSERT INTO
                requests (
                    id,
                    employee_id,
                    processor_id,
                    request_type,
                    status,
                    start_date,
                    end_date,
                    leave_period,
                    requested_time,
                    reason,
                    version,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?)
            RETURNING
                id,
                employee_id,
                processor_id,
                request_type,
                status,
                start_date,
                end_date,
                leave_period,
                requested_time,
                reason,
                rejection_reason,
                version,
                created_at,
                updated_at,
                processed_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.employee_id)
        .bind(input.processor_id)
        .bind(input.request_type)
        .bind(RequestStatus::Pending)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(input.leave_period)
        .bind(input.requested_time)
        .bind(input.reason)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Request>, sqlx::Error> {
        sqlx::query_as::<_, Request>(
            r#"
            SELECT
                id,
                employee_id,
                processor_id,
                request_type,
                status,
                start_date,
                end_date,
                leave_period,
                requested_time,
                reason,
                rejection_reason,
                version,
                created_at,
                updated_at,
                processed_at
            FROM
                requests
            WHERE
                id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Pending or approved leave requests of an employee that intersect [start, end]
    pub async fn find_overlapping_leaves(
        &self,
        employee_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Request>, sqlx::Error> {
        sqlx::query_as::<_, Request>(
            r#"
            SELECT
                id,
                employee_id,
                processor_id,
                request_type,
                status,
                start_date,
                end_date,
                leave_period,
                requested_time,
                reason,
                rejection_reason,
                version,
                created_at,
                updated_at,
                processed_at
            FROM
                requests
            WHERE
                employee_id = ?
                AND request_type = ?
                AND status IN (?, ?)
                AND start_date <= ?
                AND end_date >= ?
            ORDER BY
                start_date ASC
            "#,
        )
        .bind(employee_id)
        .bind(RequestType::Leave)
        .bind(RequestStatus::Pending)
        .bind(RequestStatus::Approved)
        .bind(end)
        .bind(start)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn list_by_employee(&self, employee_id: Uuid) -> Result<Vec<Request>, sqlx::Error> {
        sqlx::query_as::<_, Request>(
            r#"
            SELECT
                id,
                employee_id,
                processor_id,
                request_type,
                status,
                start_date,
                end_date,
                leave_period,
                requested_time,
                reason,
                rejection_reason,
                version,
                created_at,
                updated_at,
                processed_at
            FROM
                requests
            WHERE
                employee_id = ?
            ORDER BY
                created_at DESC
            "#,
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn list_by_processor(
        &self,
        processor_id: Uuid,
        status: Option<RequestStatus>,
    ) -> Result<Vec<Request>, sqlx::Error> {
        let mut query = r#"
            SELECT
                id,
                employee_id,
                processor_id,
                request_type,
                status,
                start_date,
                end_date,
                leave_period,
                requested_time,
                reason,
                rejection_reason,
                version,
                created_at,
                updated_at,
                processed_at
            FROM
                requests
            WHERE
                processor_id = ?
            "#
        .to_string();

        if status.is_some() {
            query.push_str(" AND status = ?");
        }
        query.push_str(" ORDER BY created_at DESC");

        let mut prepared = sqlx::query_as::<_, Request>(&query).bind(processor_id);
        if let Some(status) = status {
            prepared = prepared.bind(status);
        }

        prepared.fetch_all(&self.pool).await
    }

    /// Move a pending request to a new status. Returns `None` when the row is
    /// no longer pending at `expected_version`.
    pub async fn transition_status(
        &self,
        conn: &mut SqliteConnection,
        id: Uuid,
        expected_version: i64,
        status: RequestStatus,
        rejection_reason: Option<&str>,
    ) -> Result<Option<Request>, sqlx::Error> {
        let now = Utc::now();

        sqlx::query_as::<_, Request>(
            r#"
            UPDATE
                requests
            SET
                status = ?,
                rejection_reason = COALESCE(?, rejection_reason),
                version = version + 1,
                updated_at = ?,
                processed_at = ?
            WHERE
                id = ?
                AND version = ?
                AND status = ?
            RETURNING
                id,
                employee_id,
                processor_id,
                request_type,
                status,
                start_date,
                end_date,
                leave_period,
                requested_time,
                reason,
                rejection_reason,
                version,
                created_at,
                updated_at,
                processed_at
            "#,
        )
        .bind(status)
        .bind(rejection_reason)
        .bind(now)
        .bind(now)
        .bind(id)
        .bind(expected_version)
        .bind(RequestStatus::Pending)
        .fetch_optional(&mut *conn)
        .await
    }

    /// Hand a pending request to another processor, guarded like `transition_status`.
    pub async fn reassign_processor(
        &self,
        conn: &mut SqliteConnection,
        id: Uuid,
        expected_version: i64,
        new_processor_id: Uuid,
    ) -> Result<Option<Request>, sqlx::Error> {
        sqlx::query_as::<_, Request>(
            r#"
            UPDATE
                requests
            SET
                processor_id = ?,
                version = version + 1,
                updated_at = ?
            WHERE
                id = ?
                AND version = ?
                AND status = ?
            RETURNING
                id,
                employee_id,
                processor_id,
                request_type,
                status,
                start_date,
                end_date,
                leave_period,
                requested_time,
                reason,
                rejection_reason,
                version,
                created_at,
                updated_at,
                processed_at
            "#,
        )
        .bind(new_processor_id)
        .bind(Utc::now())
        .bind(id)
        .bind(expected_version)
        .bind(RequestStatus::Pending)
        .fetch_optional(&mut *conn)
        .await
    }
}
