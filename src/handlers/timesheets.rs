use actix_web::{
    HttpResponse,
    web::{Data, Path, Query},
};
use chrono::NaiveDate;
use uuid::Uuid;

use crate::AppState;
use crate::database::models::TimesheetQuery;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;

/// Own timesheets by default; staff may pass `employeeId`.
pub async fn list_timesheets(
    claims: Claims,
    state: Data<AppState>,
    query: Query<TimesheetQuery>,
) -> Result<HttpResponse, AppError> {
    let employee_id = query.employee_id.unwrap_or(claims.user_id());
    if employee_id != claims.user_id() && !claims.is_staff() {
        return Err(AppError::Forbidden(
            "Cannot view another employee's timesheets".to_string(),
        ));
    }

    let sheets = state
        .timesheet_service
        .list(employee_id, query.from, query.to)
        .await?;
    Ok(ApiResponse::success(sheets))
}

pub async fn finalize_day(
    claims: Claims,
    state: Data<AppState>,
    path: Path<(Uuid, NaiveDate)>,
) -> Result<HttpResponse, AppError> {
    claims.requires_hr_or_admin()?;

    let (employee_id, date) = path.into_inner();
    let sheet = state.timesheet_service.finalize(employee_id, date).await?;
    Ok(ApiResponse::success_with_message(sheet, "Timesheet finalized"))
}
