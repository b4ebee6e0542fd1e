use actix_web::{
    HttpRequest, HttpResponse,
    http::header::{self, ContentDisposition, DispositionParam, DispositionType},
    web::{Bytes, Data, Path, Query},
};
use uuid::Uuid;

use crate::AppState;
use crate::database::models::UploadQuery;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;

/// Raw request body, named by the `filename` query parameter.
pub async fn upload_file(
    claims: Claims,
    state: Data<AppState>,
    req: HttpRequest,
    query: Query<UploadQuery>,
    body: Bytes,
) -> Result<HttpResponse, AppError> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());

    let file = state
        .file_service
        .upload(claims.user_id(), &query.filename, content_type, &body)
        .await?;
    Ok(ApiResponse::created(file))
}

pub async fn download_file(
    claims: Claims,
    state: Data<AppState>,
    path: Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let (file, bytes) = state
        .file_service
        .download(path.into_inner(), claims.user_id(), claims.role)
        .await?;

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, file.content_type.as_str()))
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(file.original_name.clone())],
        })
        .body(bytes))
}
