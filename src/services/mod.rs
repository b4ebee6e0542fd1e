pub mod auth;
pub mod delivery;
pub mod events;
pub mod file_storage;
pub mod notification;
pub mod profile;
pub mod request_workflow;
pub mod template;
pub mod timesheet;

pub use auth::{AuthService, Claims};
pub use delivery::{ConnectionRegistry, DeliveryChannel, PushChannel, Subscription};
pub use events::{EventPublisher, NotificationDispatcher, RequestEvent, event_queue};
pub use file_storage::FileService;
pub use notification::NotificationService;
pub use profile::ProfileService;
pub use request_workflow::RequestService;
pub use timesheet::TimesheetService;
