use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DailyTimeSheet {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub work_date: NaiveDate,
    pub morning_status: AttendanceStatus,
    pub afternoon_status: AttendanceStatus,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
    pub work_credit: f64,
    pub late_minutes: i64,
    pub early_leave_minutes: i64,
    pub overtime_minutes: i64,
    pub finalized: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DailyTimeSheet {
    /// Blank day, not yet persisted.
    pub fn empty(employee_id: Uuid, work_date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            employee_id,
            work_date,
            morning_status: AttendanceStatus::Absent,
            afternoon_status: AttendanceStatus::Absent,
            check_in: None,
            check_out: None,
            work_credit: 0.0,
            late_minutes: 0,
            early_leave_minutes: 0,
            overtime_minutes: 0,
            finalized: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_full_day_leave(&self) -> bool {
        self.morning_status == AttendanceStatus::Leave
            && self.afternoon_status == AttendanceStatus::Leave
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetQuery {
    pub employee_id: Option<Uuid>,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum AttendanceStatus {
        Absent => "absent",
        Present => "present",
        Leave => "leave",
    }
}
