use actix_web::web;

use crate::handlers::departments;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/departments")
            .route("", web::post().to(departments::create_department))
            .route("", web::get().to(departments::list_departments))
            .route("/{id}", web::get().to(departments::get_department))
            .route("/{id}/members", web::get().to(departments::list_members))
            .route("/{id}/manager", web::put().to(departments::set_manager)),
    );
}
