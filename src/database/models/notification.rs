use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::macros::string_enum;
use super::user::Role;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub notification_type: NotificationType,
    pub reference_type: ReferenceType,
    pub reference_id: Uuid,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct NotificationTemplate {
    pub id: Uuid,
    pub notification_type: NotificationType,
    /// `None` applies to every role without a dedicated template
    pub role: Option<Role>,
    pub title_template: String,
    pub message_template: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationTemplateInput {
    pub notification_type: NotificationType,
    pub role: Option<Role>,
    pub title_template: String,
    pub message_template: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Everything needed to render and persist one notification.
#[derive(Debug, Clone)]
pub struct NotificationContext {
    pub recipient_id: Uuid,
    pub recipient_role: Role,
    pub notification_type: NotificationType,
    pub reference_type: ReferenceType,
    pub reference_id: Uuid,
    pub data: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCount {
    pub unread: i64,
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum NotificationType {
        RequestCreated => "request_created",
        RequestApproved => "request_approved",
        RequestRejected => "request_rejected",
        RequestDelegated => "request_delegated",
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum ReferenceType {
        Request => "request",
    }
}
