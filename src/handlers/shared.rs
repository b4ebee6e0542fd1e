use actix_web::{HttpResponse, http::StatusCode};
use serde::{Deserialize, Serialize};

/// Uniform response envelope shared by every endpoint.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub success: bool,
    pub status_code: u16,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn with_status(status: StatusCode, data: Option<T>, message: Option<String>) -> Self {
        Self {
            data,
            success: true,
            status_code: status.as_u16(),
            message,
            error: None,
        }
    }

    // 200 with data
    pub fn success(data: T) -> HttpResponse {
        HttpResponse::Ok().json(Self::with_status(StatusCode::OK, Some(data), None))
    }

    // 201 with data
    pub fn created(data: T) -> HttpResponse {
        HttpResponse::Created().json(Self::with_status(StatusCode::CREATED, Some(data), None))
    }

    pub fn success_with_message(data: T, message: &str) -> HttpResponse {
        HttpResponse::Ok().json(Self::with_status(
            StatusCode::OK,
            Some(data),
            Some(message.to_string()),
        ))
    }
}

impl ApiResponse<()> {
    pub fn success_message(message: &str) -> HttpResponse {
        HttpResponse::Ok().json(Self::with_status(
            StatusCode::OK,
            None,
            Some(message.to_string()),
        ))
    }

    // Error envelope, rendered by AppError
    pub fn error(status: StatusCode, code: &str, message: &str) -> Self {
        Self {
            data: None,
            success: false,
            status_code: status.as_u16(),
            message: Some(message.to_string()),
            error: Some(code.to_string()),
        }
    }
}
