use chrono::{NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::database::models::DailyTimeSheet;

#[derive(Clone)]
pub struct TimesheetRepository {
    pool: SqlitePool,
}

impl TimesheetRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn acquire(&self) -> Result<sqlx::pool::PoolConnection<sqlx::Sqlite>, sqlx::Error> {
        self.pool.acquire().await
    }

    pub async fn find_by_day(
        &self,
        conn: &mut SqliteConnection,
        employee_id: Uuid,
        work_date: NaiveDate,
    ) -> Result<Option<DailyTimeSheet>, sqlx::Error> {
        sqlx::query_as::<_, DailyTimeSheet>(
            r#"
            SELECT
                id,
                employee_id,
                work_date,
                morning_status,
                afternoon_status,
                check_in,
                check_out,
                work_credit,
                late_minutes,
                early_leave_minutes,
                overtime_minutes,
                finalized,
                created_at,
                updated_at
            FROM
                daily_timesheets
            WHERE
                employee_id = ?
                AND work_date = ?
            "#,
        )
        .bind(employee_id)
        .bind(work_date)
        .fetch_optional(&mut *conn)
        .await
    }

    pub async fn list_range(
        &self,
        employee_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyTimeSheet>, sqlx::Error> {
        sqlx::query_as::<_, DailyTimeSheet>(
            r#"
            SELECT
                id,
                employee_id,
                work_date,
                morning_status,
                afternoon_status,
                check_in,
                check_out,
                work_credit,
                late_minutes,
                early_leave_minutes,
                overtime_minutes,
                finalized,
                created_at,
                updated_at
            FROM
                daily_timesheets
            WHERE
                employee_id = ?
                AND work_date >= ?
                AND work_date <= ?
            ORDER BY
                work_date ASC
            "#,
        )
        .bind(employee_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn insert(
        &self,
        conn: &mut SqliteConnection,
        sheet: &DailyTimeSheet,
    ) -> Result<DailyTimeSheet, sqlx::Error> {
        sqlx::query_as::<_, DailyTimeSheet>(
            r#"
            INSERT INTO
                daily_timesheets (
                    id,
                    employee_id,
                    work_date,
                    morning_status,
                    afternoon_status,
                    check_in,
                    check_out,
                    work_credit,
                    late_minutes,
                    early_leave_minutes,
                    overtime_minutes,
                    finalized,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING
                id,
                employee_id,
                work_date,
                morning_status,
                afternoon_status,
                check_in,
                check_out,
                work_credit,
                late_minutes,
                early_leave_minutes,
                overtime_minutes,
                finalized,
                created_at,
                updated_at
            "#,
        )
        .bind(sheet.id)
        .bind(sheet.employee_id)
        .bind(sheet.work_date)
        .bind(sheet.morning_status)
        .bind(sheet.afternoon_status)
        .bind(sheet.check_in)
        .bind(sheet.check_out)
        .bind(sheet.work_credit)
        .bind(sheet.late_minutes)
        .bind(sheet.early_leave_minutes)
        .bind(sheet.overtime_minutes)
        .bind(sheet.finalized)
        .bind(sheet.created_at)
        .bind(sheet.updated_at)
        .fetch_one(&mut *conn)
        .await
    }

    /// Overwrite a day that is not finalized yet. Returns `None` when the row
    /// is finalized (or gone), leaving it untouched.
    pub async fn update_unfinalized(
        &self,
        conn: &mut SqliteConnection,
        sheet: &DailyTimeSheet,
    ) -> Result<Option<DailyTimeSheet>, sqlx::Error> {
        sqlx::query_as::<_, DailyTimeSheet>(
            r#"
            UPDATE
                daily_timesheets
            SET
                morning_status = ?,
                afternoon_status = ?,
                check_in = ?,
                check_out = ?,
                work_credit = ?,
                late_minutes = ?,
                early_leave_minutes = ?,
                overtime_minutes = ?,
                finalized = ?,
                updated_at = ?
            WHERE
                id = ?
                AND finalized = 0
            RETURNING
                id,
                employee_id,
                work_date,
                morning_status,
                afternoon_status,
                check_in,
                check_out,
                work_credit,
                late_minutes,
                early_leave_minutes,
                overtime_minutes,
                finalized,
                created_at,
                updated_at
            "#,
        )
        .bind(sheet.morning_status)
        .bind(sheet.afternoon_status)
        .bind(sheet.check_in)
        .bind(sheet.check_out)
        .bind(sheet.work_credit)
        .bind(sheet.late_minutes)
        .bind(sheet.early_leave_minutes)
        .bind(sheet.overtime_minutes)
        .bind(sheet.finalized)
        .bind(Utc::now())
        .bind(sheet.id)
        .fetch_optional(&mut *conn)
        .await
    }
}
