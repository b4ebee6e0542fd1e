use actix_web::web;

use crate::error::AppError;

pub mod auth;
pub mod departments;
pub mod files;
pub mod notifications;
pub mod requests;
pub mod timesheets;
pub mod users;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(auth::configure)
            .configure(users::configure)
            .configure(departments::configure)
            .configure(requests::configure)
            .configure(notifications::configure)
            .configure(timesheets::configure)
            .configure(files::configure),
    );
}

/// Body limits and malformed-input errors rendered through the shared envelope.
pub fn configure_extractors(max_upload_bytes: usize) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::PayloadConfig::new(max_upload_bytes))
            .app_data(
                web::JsonConfig::default()
                    .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
            )
            .app_data(
                web::QueryConfig::default()
                    .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
            )
            .app_data(
                web::PathConfig::default()
                    .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
            );
    }
}
