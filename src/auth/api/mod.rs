//! User HTTP interface

pub mod handlers;
pub mod routes;

pub use routes::create_user_routes;
