use actix_web::{
    HttpResponse,
    web::{Data, Json, Path},
};
use uuid::Uuid;

use crate::AppState;
use crate::database::models::{DepartmentInput, SetManagerInput, UserInfo};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;

pub async fn create_department(
    claims: Claims,
    state: Data<AppState>,
    input: Json<DepartmentInput>,
) -> Result<HttpResponse, AppError> {
    claims.requires_hr_or_admin()?;

    let department = state
        .profile_service
        .create_department(input.into_inner())
        .await?;
    Ok(ApiResponse::created(department))
}

pub async fn list_departments(
    _claims: Claims,
    state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let departments = state.profile_service.list_departments().await?;
    Ok(ApiResponse::success(departments))
}

pub async fn get_department(
    _claims: Claims,
    state: Data<AppState>,
    path: Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let department = state.profile_service.get_department(path.into_inner()).await?;
    Ok(ApiResponse::success(department))
}

pub async fn list_members(
    claims: Claims,
    state: Data<AppState>,
    path: Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_staff() {
        return Err(AppError::Forbidden(
            "Only managers, HR or administrators can list members".to_string(),
        ));
    }

    let members: Vec<UserInfo> = state
        .profile_service
        .list_members(path.into_inner())
        .await?
        .into_iter()
        .map(UserInfo::from)
        .collect();

    Ok(ApiResponse::success(members))
}

pub async fn set_manager(
    claims: Claims,
    state: Data<AppState>,
    path: Path<Uuid>,
    input: Json<SetManagerInput>,
) -> Result<HttpResponse, AppError> {
    claims.requires_hr_or_admin()?;

    let department = state
        .profile_service
        .set_manager(path.into_inner(), input.manager_id)
        .await?;
    Ok(ApiResponse::success(department))
}
