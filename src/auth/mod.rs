//! User accounts and authentication
//!
//! ```text
//! auth/
//! ├── types.rs          # user record, request and response types
//! ├── config.rs         # secret, token lifetime, password policy
//! ├── middleware.rs     # bearer-token guard and CurrentUser extractor
//! ├── core/             # account logic
//! │   ├── user_service.rs
//! │   ├── token_service.rs
//! │   └── password_service.rs
//! ├── storage/          # UserStorage trait and in-memory backend
//! └── api/              # routes and handlers
//! ```

pub mod api;
pub mod config;
pub mod core;
pub mod middleware;
pub mod storage;
pub mod types;

pub use self::core::{PasswordService, TokenService, UserService};
pub use api::create_user_routes;
pub use config::AuthConfig;
pub use middleware::{require_auth, CurrentUser};
pub use storage::{MemoryUserStorage, UserStorage};
pub use types::{Subscription, User};
