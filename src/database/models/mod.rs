pub mod auth;
pub mod department;
pub mod file;
pub mod macros;
pub mod notification;
pub mod request;
pub mod timesheet;
pub mod user;

// Re-export all models for easy importing
pub use auth::*;
pub use department::*;
pub use file::*;
pub use notification::*;
pub use request::*;
pub use timesheet::*;
pub use user::*;
