pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod session;
pub mod store;
pub mod usecase;
