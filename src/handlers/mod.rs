pub mod auth;
pub mod departments;
pub mod files;
pub mod notifications;
pub mod requests;
pub mod shared;
pub mod timesheets;
pub mod users;
