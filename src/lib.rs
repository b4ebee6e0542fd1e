pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;

use std::sync::Arc;

use sqlx::SqlitePool;

pub use config::Config;
pub use error::AppError;

use database::repositories::{
    DepartmentRepository, FileRepository, NotificationRepository, NotificationTemplateRepository,
    RequestRepository, TimesheetRepository, UserRepository,
};
use services::{
    AuthService, ConnectionRegistry, FileService, NotificationDispatcher, NotificationService,
    ProfileService, PushChannel, RequestService, TimesheetService, event_queue,
};

pub struct AppState {
    pub auth_service: AuthService,
    pub profile_service: ProfileService,
    pub request_service: RequestService,
    pub notification_service: NotificationService,
    pub timesheet_service: TimesheetService,
    pub file_service: FileService,
    pub connections: ConnectionRegistry,
}

impl AppState {
    /// Wire repositories and services. The returned dispatcher must be run
    /// (or drained) for lifecycle notifications to be produced.
    pub fn build(pool: SqlitePool, config: &Config) -> (Self, NotificationDispatcher) {
        let user_repository = UserRepository::new(pool.clone());
        let department_repository = DepartmentRepository::new(pool.clone());
        let request_repository = RequestRepository::new(pool.clone());
        let timesheet_repository = TimesheetRepository::new(pool.clone());
        let notification_repository = NotificationRepository::new(pool.clone());
        let template_repository = NotificationTemplateRepository::new(pool.clone());
        let file_repository = FileRepository::new(pool);

        let connections = ConnectionRegistry::new(config.notification_buffer);

        let notification_service = NotificationService::new(
            notification_repository,
            template_repository,
            config.template_cache_ttl_secs,
        )
        .with_channel(Arc::new(PushChannel::new(connections.clone())));

        let (publisher, dispatcher) =
            event_queue(notification_service.clone(), user_repository.clone());

        let profile_service =
            ProfileService::new(user_repository.clone(), department_repository);
        let timesheet_service = TimesheetService::new(timesheet_repository, config.work_schedule);
        let request_service = RequestService::new(
            request_repository,
            user_repository.clone(),
            profile_service.clone(),
            timesheet_service.clone(),
            publisher,
        );

        let state = AppState {
            auth_service: AuthService::new(user_repository, config.clone()),
            profile_service,
            request_service,
            notification_service,
            timesheet_service,
            file_service: FileService::new(
                file_repository,
                &config.upload_dir,
                config.max_upload_bytes,
            ),
            connections,
        };

        (state, dispatcher)
    }
}
