//! Core account logic

pub mod password_service;
pub mod token_service;
pub mod user_service;

pub use password_service::PasswordService;
pub use token_service::{TokenError, TokenService};
pub use user_service::{gravatar_url, UserService};
