use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, middleware::Logger, web};
use anyhow::Result;

use hrms::database::init_database;
use hrms::middleware::RequestIdMiddleware;
use hrms::{AppState, Config, routes};

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    }))
}

#[actix_web::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!(
        "Starting HR service (environment: {})",
        config.environment
    );

    let pool = init_database(&config.database_url).await?;
    log::info!("Database initialized");

    let (state, dispatcher) = AppState::build(pool, &config);
    tokio::spawn(dispatcher.run());

    let app_state = web::Data::new(state);
    let config_data = web::Data::new(config.clone());

    let server_address = config.server_address();
    log::info!("Listening on http://{}", server_address);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(config_data.clone())
            .wrap(
                Cors::default()
                    .allowed_origin(&config_data.cors_origin)
                    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                    .allowed_headers(vec![
                        "Authorization",
                        "Content-Type",
                        "Accept",
                        "X-Requested-With",
                        "X-Correlation-ID",
                    ])
                    .expose_headers(vec!["X-Correlation-ID"])
                    .max_age(3600),
            )
            .wrap(RequestIdMiddleware)
            .wrap(Logger::new(
                r#"%a "%r" %s %b "%{User-Agent}i" %T correlation_id=%{x-correlation-id}o"#,
            ))
            .configure(routes::configure_extractors(config_data.max_upload_bytes))
            .service(health)
            .configure(routes::configure)
    })
    .bind(&server_address)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
