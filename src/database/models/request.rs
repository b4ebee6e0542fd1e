use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub processor_id: Uuid,
    pub request_type: RequestType,
    pub status: RequestStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub leave_period: Option<DayPeriod>,
    pub requested_time: Option<NaiveTime>,
    pub reason: Option<String>,
    pub rejection_reason: Option<String>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl Request {
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestInput {
    pub request_type: RequestType,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub leave_period: Option<DayPeriod>,
    pub requested_time: Option<NaiveTime>,
    pub reason: Option<String>,
    pub processor_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectRequestInput {
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegateRequestInput {
    pub new_processor_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestQuery {
    pub status: Option<RequestStatus>,
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum RequestType {
        Leave => "leave",
        CheckIn => "check_in",
        CheckOut => "check_out",
    }
}

impl RequestType {
    /// Label used in rendered notifications.
    pub fn label(&self) -> &'static str {
        match self {
            RequestType::Leave => "LEAVE",
            RequestType::CheckIn => "CHECK_IN",
            RequestType::CheckOut => "CHECK_OUT",
        }
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum RequestStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        Cancelled => "cancelled",
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum DayPeriod {
        FullDay => "full_day",
        Morning => "morning",
        Afternoon => "afternoon",
    }
}

impl DayPeriod {
    pub fn covers_morning(&self) -> bool {
        matches!(self, DayPeriod::FullDay | DayPeriod::Morning)
    }

    pub fn covers_afternoon(&self) -> bool {
        matches!(self, DayPeriod::FullDay | DayPeriod::Afternoon)
    }
}
