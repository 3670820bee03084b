use std::sync::Arc;

use axum::{
    error_handling::HandleErrorLayer,
    extract::DefaultBodyLimit,
    http::{header::CONTENT_TYPE, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower::{limit::ConcurrencyLimitLayer, timeout::TimeoutLayer, BoxError, ServiceBuilder};
use tower_http::{limit::RequestBodyLimitLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;

use crate::{
    api::{cors::create_cors_layer, handlers, server_config::*, state::AppState},
    auth::{create_user_routes, PasswordService, TokenService, UserService},
    avatars::{AvatarStore, AVATARS_PREFIX},
    config::AppConfig,
    contacts::{api::create_contact_routes, ContactService},
    errors::ApiError,
    mail::{self, Mailer},
    storage::{self, StorageBackends},
};

/// HTTP server for the accounts and contacts API
#[derive(Clone)]
pub struct AppServer {
    config: AppConfig,
    state: AppState,
}

impl AppServer {
    /// Connect storage and mail as configured
    pub async fn new(config: AppConfig) -> Result<Self, ApiError> {
        let backends = storage::connect(&config.storage).await?;
        let mailer = mail::from_config(&config.mail)?;
        Self::with_parts(config, backends, mailer)
    }

    /// Assemble the server from already constructed collaborators
    pub fn with_parts(
        config: AppConfig,
        backends: StorageBackends,
        mailer: Arc<dyn Mailer>,
    ) -> Result<Self, ApiError> {
        let tokens = Arc::new(TokenService::new(
            config.auth.jwt_secret.clone(),
            config.auth.token_expiry,
        )?);
        let users = UserService::new(
            backends.users,
            tokens,
            PasswordService::new(config.auth.password.clone()),
            mailer,
            config.mail.base_url.clone(),
        );

        let state = AppState {
            users: Arc::new(users),
            contacts: Arc::new(ContactService::new(backends.contacts)),
            avatars: Arc::new(AvatarStore::new(&config.avatars)),
        };

        Ok(Self { config, state })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn create_router(&self) -> Router {
        let state = self.state.clone();

        Router::new()
            .route("/health", get(handlers::health_check))
            .merge(create_user_routes(state.clone()))
            .merge(create_contact_routes(state.clone()))
            .nest_service(
                &format!("/{AVATARS_PREFIX}"),
                ServeDir::new(self.config.avatars.avatars_dir()),
            )
            .fallback(handlers::not_found)
            .with_state(state)
            .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
            .layer(
                ServiceBuilder::new()
                    .layer(HandleErrorLayer::new(handle_layer_error))
                    .layer(ConcurrencyLimitLayer::new(MAX_CONCURRENCY))
                    .layer(RequestBodyLimitLayer::new(MAX_UPLOAD_SIZE))
                    .layer(TimeoutLayer::new(REQUEST_TIMEOUT)),
            )
            .layer(middleware::map_response(json_rejections))
            .layer(create_cors_layer(&self.config.server.cors_allow_origin))
            .layer(TraceLayer::new_for_http())
    }

    pub async fn start(self) -> Result<(), anyhow::Error> {
        let app = self.create_router();
        let addr = format!("{}:{}", self.config.server.host, self.config.server.port);
        let listener = TcpListener::bind(&addr).await?;
        info!("Server listening on {}", addr);

        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

/// Timeout and overload errors from the tower stack
async fn handle_layer_error(err: BoxError) -> ApiError {
    if err.is::<tower::timeout::error::Elapsed>() {
        ApiError::Timeout
    } else {
        ApiError::Overloaded
    }
}

/// Re-render the plain-text 413 of `RequestBodyLimitLayer` as an `ApiError`
async fn json_rejections(response: Response) -> Response {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));

    if response.status() == StatusCode::PAYLOAD_TOO_LARGE && !is_json {
        return ApiError::PayloadTooLarge.into_response();
    }
    response
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_layer_errors_map_to_api_errors() {
        let elapsed: BoxError = Box::new(tower::timeout::error::Elapsed::new());
        assert!(matches!(handle_layer_error(elapsed).await, ApiError::Timeout));

        let other: BoxError = "overloaded".into();
        assert!(matches!(handle_layer_error(other).await, ApiError::Overloaded));
    }

    #[tokio::test]
    async fn test_plain_413_is_rendered_as_json() {
        let plain = (StatusCode::PAYLOAD_TOO_LARGE, "length limit exceeded").into_response();
        let rendered = json_rejections(plain).await;

        assert_eq!(rendered.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            rendered.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
