// src/api/mod.rs

pub mod cors;
pub mod extract;
pub mod handlers;
pub mod server;
pub mod server_config; // request limits and timeouts
pub mod state;

pub use server::AppServer;
pub use state::AppState;
