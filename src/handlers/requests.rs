use actix_web::{
    HttpResponse,
    web::{Data, Json, Path, Query},
};
use uuid::Uuid;

use crate::AppState;
use crate::database::models::{
    CreateRequestInput, DelegateRequestInput, RejectRequestInput, RequestQuery,
};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;

/// Submit a leave, check-in or check-out request for the caller.
pub async fn create_request(
    claims: Claims,
    state: Data<AppState>,
    input: Json<CreateRequestInput>,
) -> Result<HttpResponse, AppError> {
    let request = state
        .request_service
        .create(claims.user_id(), input.into_inner())
        .await?;
    Ok(ApiResponse::created(request))
}

pub async fn my_requests(claims: Claims, state: Data<AppState>) -> Result<HttpResponse, AppError> {
    let requests = state.request_service.list_mine(claims.user_id()).await?;
    Ok(ApiResponse::success(requests))
}

/// Requests the caller is currently responsible for.
pub async fn assigned_requests(
    claims: Claims,
    state: Data<AppState>,
    query: Query<RequestQuery>,
) -> Result<HttpResponse, AppError> {
    let requests = state
        .request_service
        .list_assigned(claims.user_id(), query.status)
        .await?;
    Ok(ApiResponse::success(requests))
}

pub async fn get_request(
    claims: Claims,
    state: Data<AppState>,
    path: Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let request = state
        .request_service
        .get(path.into_inner(), claims.user_id())
        .await?;
    Ok(ApiResponse::success(request))
}

pub async fn approve_request(
    claims: Claims,
    state: Data<AppState>,
    path: Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let request = state
        .request_service
        .approve(path.into_inner(), claims.user_id())
        .await?;
    Ok(ApiResponse::success_with_message(request, "Request approved"))
}

pub async fn reject_request(
    claims: Claims,
    state: Data<AppState>,
    path: Path<Uuid>,
    input: Json<RejectRequestInput>,
) -> Result<HttpResponse, AppError> {
    let request = state
        .request_service
        .reject(path.into_inner(), claims.user_id(), &input.reason)
        .await?;
    Ok(ApiResponse::success_with_message(request, "Request rejected"))
}

pub async fn delegate_request(
    claims: Claims,
    state: Data<AppState>,
    path: Path<Uuid>,
    input: Json<DelegateRequestInput>,
) -> Result<HttpResponse, AppError> {
    let request = state
        .request_service
        .delegate(path.into_inner(), claims.user_id(), input.new_processor_id)
        .await?;
    Ok(ApiResponse::success_with_message(request, "Request delegated"))
}

pub async fn cancel_request(
    claims: Claims,
    state: Data<AppState>,
    path: Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let request = state
        .request_service
        .cancel(path.into_inner(), claims.user_id())
        .await?;
    Ok(ApiResponse::success_with_message(request, "Request cancelled"))
}
