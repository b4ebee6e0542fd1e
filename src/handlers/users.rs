use actix_web::{
    HttpResponse,
    web::{Data, Json, Path, Query},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::AppState;
use crate::database::models::{
    AssignDepartmentInput, CreateUserInput, UpdateProfileInput, UserInfo,
};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
    pub department_id: Option<Uuid>,
}

pub async fn create_user(
    claims: Claims,
    state: Data<AppState>,
    input: Json<CreateUserInput>,
) -> Result<HttpResponse, AppError> {
    claims.requires_hr_or_admin()?;

    let response = state.profile_service.create_user(input.into_inner()).await?;
    Ok(ApiResponse::created(response))
}

/// Managers, HR and administrators only.
pub async fn list_users(
    claims: Claims,
    state: Data<AppState>,
    query: Query<UserListQuery>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_staff() {
        return Err(AppError::Forbidden(
            "Only managers, HR or administrators can list users".to_string(),
        ));
    }

    let users: Vec<UserInfo> = state
        .profile_service
        .list_users(query.department_id)
        .await?
        .into_iter()
        .map(UserInfo::from)
        .collect();

    Ok(ApiResponse::success(users))
}

pub async fn get_user(
    claims: Claims,
    state: Data<AppState>,
    path: Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    if claims.user_id() != user_id && !claims.is_staff() {
        return Err(AppError::Forbidden(
            "Cannot access another user's profile".to_string(),
        ));
    }

    let user = state.profile_service.get_user(user_id).await?;
    Ok(ApiResponse::success(UserInfo::from(user)))
}

pub async fn update_profile(
    claims: Claims,
    state: Data<AppState>,
    path: Path<Uuid>,
    input: Json<UpdateProfileInput>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    claims.requires_self_or_hr(user_id)?;

    let user = state
        .profile_service
        .update_profile(user_id, input.into_inner())
        .await?;
    Ok(ApiResponse::success(UserInfo::from(user)))
}

pub async fn assign_department(
    claims: Claims,
    state: Data<AppState>,
    path: Path<Uuid>,
    input: Json<AssignDepartmentInput>,
) -> Result<HttpResponse, AppError> {
    claims.requires_hr_or_admin()?;

    let user = state
        .profile_service
        .assign_department(path.into_inner(), input.department_id)
        .await?;
    Ok(ApiResponse::success(UserInfo::from(user)))
}
