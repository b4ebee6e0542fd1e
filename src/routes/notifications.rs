use actix_web::web;

use crate::handlers::notifications;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/notifications")
            .route("", web::get().to(notifications::list_notifications))
            .route("/unread-count", web::get().to(notifications::unread_count))
            .route("/stream", web::get().to(notifications::stream_notifications))
            .route("/read-all", web::post().to(notifications::mark_all_read))
            .route("/{id}/read", web::post().to(notifications::mark_as_read)),
    )
    .service(
        web::scope("/notification-templates")
            .route("", web::get().to(notifications::list_templates))
            .route("", web::put().to(notifications::upsert_template)),
    );
}
