use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
    pub department_id: Option<Uuid>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum Role {
        Admin => "admin",
        Manager => "manager",
        Employee => "employee",
        Hr => "hr",
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Employee
    }
}

impl Role {
    /// Roles allowed to take over a pending request by delegation.
    pub fn can_receive_delegation(&self) -> bool {
        matches!(self, Role::Admin | Role::Hr)
    }

    /// Roles allowed to act as the processor of a request.
    pub fn can_process_requests(&self) -> bool {
        matches!(self, Role::Admin | Role::Hr | Role::Manager)
    }

    pub fn is_hr_or_admin(&self) -> bool {
        matches!(self, Role::Admin | Role::Hr)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserInput {
    pub email: String,
    pub full_name: String,
    pub password: Option<String>,
    #[serde(default)]
    pub role: Role,
    pub department_id: Option<Uuid>,
    pub phone: Option<String>,
    pub position: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignDepartmentInput {
    pub department_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub department_id: Option<Uuid>,
    pub phone: Option<String>,
    pub position: Option<String>,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            department_id: user.department_id,
            phone: user.phone,
            position: user.position,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserResponse {
    pub user: UserInfo,
    /// Only present when the password was generated by the server
    pub temporary_password: Option<String>,
}

impl User {
    pub fn new(input: &CreateUserInput, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: input.email.trim().to_lowercase(),
            password_hash,
            full_name: input.full_name.trim().to_string(),
            role: input.role,
            department_id: input.department_id,
            phone: input.phone.clone(),
            position: input.position.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_admin_and_hr_receive_delegation() {
        assert!(Role::Admin.can_receive_delegation());
        assert!(Role::Hr.can_receive_delegation());
        assert!(!Role::Manager.can_receive_delegation());
        assert!(!Role::Employee.can_receive_delegation());
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("HR".parse::<Role>().unwrap(), Role::Hr);
        assert_eq!("manager".parse::<Role>().unwrap(), Role::Manager);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn role_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Role::Hr).unwrap(), "\"HR\"");
    }
}
