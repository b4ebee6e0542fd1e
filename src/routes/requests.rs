use actix_web::web;

use crate::handlers::requests;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/requests")
            .route("", web::post().to(requests::create_request))
            .route("/my", web::get().to(requests::my_requests))
            .route("/assigned", web::get().to(requests::assigned_requests))
            .route("/{id}", web::get().to(requests::get_request))
            .route("/{id}/approve", web::post().to(requests::approve_request))
            .route("/{id}/reject", web::post().to(requests::reject_request))
            .route("/{id}/delegate", web::post().to(requests::delegate_request))
            .route("/{id}/cancel", web::post().to(requests::cancel_request)),
    );
}
