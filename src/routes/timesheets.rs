use actix_web::web;

use crate::handlers::timesheets;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/timesheets")
            .route("", web::get().to(timesheets::list_timesheets))
            .route(
                "/{employee_id}/{date}/finalize",
                web::post().to(timesheets::finalize_day),
            ),
    );
}
