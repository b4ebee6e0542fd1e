use actix_web::{
    HttpResponse,
    web::{Data, Json},
};

use crate::AppState;
use crate::database::models::{ChangePasswordInput, LoginInput, UserInfo};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;

/// Exchange (email, password, role) for a signed token.
pub async fn login(
    state: Data<AppState>,
    input: Json<LoginInput>,
) -> Result<HttpResponse, AppError> {
    let response = state.auth_service.login(input.into_inner()).await?;
    Ok(ApiResponse::success(response))
}

pub async fn me(claims: Claims, state: Data<AppState>) -> Result<HttpResponse, AppError> {
    let user = state.auth_service.current_user(&claims).await?;
    Ok(ApiResponse::success(UserInfo::from(user)))
}

pub async fn change_password(
    claims: Claims,
    state: Data<AppState>,
    input: Json<ChangePasswordInput>,
) -> Result<HttpResponse, AppError> {
    state
        .auth_service
        .change_password(
            claims.user_id(),
            &input.current_password,
            &input.new_password,
        )
        .await?;

    Ok(ApiResponse::success_message("Password changed"))
}
