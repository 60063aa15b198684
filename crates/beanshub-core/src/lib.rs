//! Ambient plumbing shared by BeansHub binaries: tracing setup, environment
//! configuration, and wire-format helpers.

pub mod config;
pub mod serde;
pub mod tracing;
