//! Contact routes

use axum::{
    middleware,
    routing::{get, patch},
    Router,
};

use super::handlers;
use crate::{api::state::AppState, auth::middleware::require_auth};

pub fn create_contact_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/contacts",
            get(handlers::list_contacts).post(handlers::create_contact),
        )
        .route(
            "/contacts/:contact_id",
            get(handlers::get_contact)
                .put(handlers::update_contact)
                .delete(handlers::delete_contact),
        )
        .route(
            "/contacts/:contact_id/favorite",
            patch(handlers::update_favorite),
        )
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}
