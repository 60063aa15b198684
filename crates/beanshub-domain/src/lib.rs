//! Domain types shared across BeansHub crates.
//!
//! This crate contains only pure types with no framework dependencies.
//! Backend document mapping lives in `beanshub-client`; nothing here knows
//! how a record is stored.

pub mod bean;
pub mod id;
pub mod notification;
pub mod roasting;
pub mod sale;
pub mod stored;
pub mod user;
