pub mod auth;
pub mod notification;
pub mod records;
pub mod user;
