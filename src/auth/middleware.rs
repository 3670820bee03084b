//! Bearer-token authentication middleware
//!
//! [`require_auth`] runs in front of every protected route. It either attaches
//! a [`CurrentUser`] to the request or answers 401 itself; the handler is never
//! reached without an identity.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::{
    api::state::AppState,
    auth::types::User,
    errors::{ApiError, AuthFailure},
};

/// The authenticated caller
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    let (scheme, token) = header.split_once(' ').unwrap_or((header, ""));
    if scheme != "Bearer" {
        return Err(ApiError::Unauthenticated(AuthFailure::MissingScheme));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(ApiError::Unauthenticated(AuthFailure::MissingToken));
    }

    Ok(token.to_string())
}

/// Reject the request unless it carries a live session token
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())?;
    let user = state.users.authenticate(&token).await?;

    tracing::debug!(user_id = %user.id, "request authenticated");
    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // only present when the route sits behind `require_auth`
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(ApiError::Unauthenticated(AuthFailure::MissingToken))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn failure(result: Result<String, ApiError>) -> AuthFailure {
        match result {
            Err(ApiError::Unauthenticated(failure)) => failure,
            other => panic!("expected auth failure, got {other:?}"),
        }
    }

    #[test]
    fn test_extract_token() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(failure(bearer_token(&HeaderMap::new())), AuthFailure::MissingScheme);
    }

    #[test]
    fn test_wrong_scheme() {
        assert_eq!(failure(bearer_token(&headers("Basic abc"))), AuthFailure::MissingScheme);
        assert_eq!(failure(bearer_token(&headers("bearer abc"))), AuthFailure::MissingScheme);
    }

    #[test]
    fn test_scheme_without_token() {
        assert_eq!(failure(bearer_token(&headers("Bearer"))), AuthFailure::MissingToken);
        assert_eq!(failure(bearer_token(&headers("Bearer   "))), AuthFailure::MissingToken);
    }
}
