use actix_web::{
    HttpResponse,
    http::header,
    web::{Bytes, Data, Json, Path, Query},
};
use futures_util::{StreamExt, future, stream};
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use uuid::Uuid;

use crate::AppState;
use crate::config::Config;
use crate::database::models::{NotificationQuery, NotificationTemplateInput, UnreadCount};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;

pub async fn list_notifications(
    claims: Claims,
    state: Data<AppState>,
    query: Query<NotificationQuery>,
) -> Result<HttpResponse, AppError> {
    let notifications = state
        .notification_service
        .list(claims.user_id(), query.limit, query.offset)
        .await?;
    Ok(ApiResponse::success(notifications))
}

pub async fn unread_count(claims: Claims, state: Data<AppState>) -> Result<HttpResponse, AppError> {
    let unread = state
        .notification_service
        .unread_count(claims.user_id())
        .await?;
    Ok(ApiResponse::success(UnreadCount { unread }))
}

pub async fn mark_as_read(
    claims: Claims,
    state: Data<AppState>,
    path: Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let notification = state
        .notification_service
        .mark_as_read(path.into_inner(), claims.user_id())
        .await?;
    Ok(ApiResponse::success(notification))
}

pub async fn mark_all_read(claims: Claims, state: Data<AppState>) -> Result<HttpResponse, AppError> {
    let updated = state
        .notification_service
        .mark_all_read(claims.user_id())
        .await?;
    Ok(ApiResponse::success(json!({ "updated": updated })))
}

fn sse_frame<T: Serialize>(event: &str, payload: &T) -> Result<Bytes, serde_json::Error> {
    let data = serde_json::to_string(payload)?;
    Ok(Bytes::from(format!("event: {}\ndata: {}\n\n", event, data)))
}

/// Server-sent events for the caller. A newer stream for the same user ends
/// this one; the stream also ends after the configured timeout.
pub async fn stream_notifications(
    claims: Claims,
    state: Data<AppState>,
    config: Data<Config>,
) -> Result<HttpResponse, AppError> {
    let subscription = state.connections.register(claims.user_id());
    let timeout = Duration::from_secs(config.notification_stream_timeout_secs);

    let connected = sse_frame(
        "connected",
        &json!({ "connectionId": subscription.connection_id() }),
    );

    let body = stream::once(future::ready(connected))
        .chain(subscription.map(|notification| sse_frame("notification", &notification)))
        .take_until(tokio::time::sleep(timeout));

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "text/event-stream"))
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .streaming(body))
}

pub async fn list_templates(
    claims: Claims,
    state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    claims.requires_hr_or_admin()?;

    let templates = state.notification_service.list_templates().await?;
    Ok(ApiResponse::success(templates))
}

pub async fn upsert_template(
    claims: Claims,
    state: Data<AppState>,
    input: Json<NotificationTemplateInput>,
) -> Result<HttpResponse, AppError> {
    claims.requires_hr_or_admin()?;

    let template = state
        .notification_service
        .upsert_template(input.into_inner())
        .await?;
    Ok(ApiResponse::success(template))
}
