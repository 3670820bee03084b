//! User API handlers

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::{
    api::{extract::ValidatedJson, state::AppState},
    auth::{middleware::CurrentUser, types::*},
    errors::ApiError,
};

/// Multipart field carrying the avatar image
const AVATAR_FIELD: &str = "avatar";

pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let user = state.users.register(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: UserProfile::from(&user),
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (token, user) = state.users.login(req).await?;
    Ok(Json(LoginResponse {
        token,
        user: SessionUser::from(&user),
    }))
}

pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<StatusCode, ApiError> {
    state.users.logout(&user).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn current(CurrentUser(user): CurrentUser) -> Json<SessionUser> {
    Json(SessionUser::from(&user))
}

pub async fn update_subscription(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(req): ValidatedJson<SubscriptionRequest>,
) -> Result<Json<SessionUser>, ApiError> {
    let updated = state
        .users
        .update_subscription(&user, req.subscription)
        .await?;
    Ok(Json(SessionUser::from(&updated)))
}

pub async fn verify_email(
    State(state): State<AppState>,
    Path(verification_token): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.users.verify_email(&verification_token).await?;
    Ok(Json(MessageResponse::new("Verification successful")))
}

pub async fn resend_verification(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ResendVerificationRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.users.resend_verification(&req.email).await?;
    Ok(Json(MessageResponse::new("Verification email sent")))
}

/// Replace the caller's avatar with the uploaded image
pub async fn update_avatar(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AvatarResponse>, ApiError> {
    let mut multipart = multipart.map_err(|_| ApiError::NoFileProvided)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(e.body_text()))?
    {
        if field.name() != Some(AVATAR_FIELD) {
            continue;
        }
        // a text part under the avatar name is not a file
        let Some(original_name) = field.file_name().map(str::to_string) else {
            continue;
        };

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::Validation(e.body_text()))?;
        if bytes.is_empty() {
            return Err(ApiError::NoFileProvided);
        }

        let avatar_url = state.avatars.store(&user.id, &original_name, bytes).await?;
        state.users.update_avatar(&user, &avatar_url).await?;

        if let Some(previous) = user.avatar_url.as_deref().filter(|url| *url != avatar_url) {
            state.avatars.remove(previous).await;
        }

        info!(user_id = %user.id, %avatar_url, "avatar updated");
        return Ok(Json(AvatarResponse { avatar_url }));
    }

    Err(ApiError::NoFileProvided)
}
