//! Handlers that belong to no resource

pub mod health;

pub use health::{health_check, not_found};
