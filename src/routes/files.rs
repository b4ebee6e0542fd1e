use actix_web::web;

use crate::handlers::files;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/files")
            .route("", web::post().to(files::upload_file))
            .route("/{id}", web::get().to(files::download_file)),
    );
}
