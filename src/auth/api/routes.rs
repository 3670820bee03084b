//! User routes

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post},
    Router,
};

use super::handlers;
use crate::{
    api::{server_config::MAX_UPLOAD_SIZE, state::AppState},
    auth::middleware::require_auth,
};

pub fn create_user_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/users/logout", post(handlers::logout))
        .route("/users/current", get(handlers::current))
        .route("/users", patch(handlers::update_subscription))
        .route(
            "/users/avatars",
            patch(handlers::update_avatar).layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE)),
        )
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    Router::new()
        .route("/users/register", post(handlers::register))
        .route("/users/login", post(handlers::login))
        .route("/users/verify", post(handlers::resend_verification))
        .route(
            "/users/verify/:verification_token",
            get(handlers::verify_email),
        )
        .merge(protected)
}
