pub mod profile;
pub mod record;
pub mod repository;
pub mod types;
