// src/lib.rs

pub mod api;
pub mod auth;
pub mod avatars;
pub mod config;
pub mod contacts;
pub mod errors;
pub mod mail;
pub mod storage;

pub use api::AppServer;
pub use config::AppConfig;
pub use errors::{ApiError, AuthFailure};
