pub mod department;
pub mod file;
pub mod notification;
pub mod notification_template;
pub mod request;
pub mod timesheet;
pub mod user;

// Re-export all repositories for easy importing
pub use department::DepartmentRepository;
pub use file::FileRepository;
pub use notification::NotificationRepository;
pub use notification_template::NotificationTemplateRepository;
pub use request::{NewRequest, RequestRepository};
pub use timesheet::TimesheetRepository;
pub use user::UserRepository;
