//! Contact API handlers
//!
//! Every handler runs behind `require_auth` and scopes its query to the
//! authenticated user.

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::{extract::ValidatedJson, state::AppState},
    auth::{middleware::CurrentUser, types::MessageResponse},
    contacts::{
        scope::OwnerScope,
        types::{Contact, ContactChanges, ContactFilter, FavoriteRequest, ListQuery, NewContact},
    },
    errors::ApiError,
};

pub async fn list_contacts(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Contact>>, ApiError> {
    let Query(query) = query?;
    let contacts = state
        .contacts
        .list(&OwnerScope::for_user(&user), ContactFilter::from_query(&query))
        .await?;
    Ok(Json(contacts))
}

pub async fn get_contact(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(contact_id): Path<String>,
) -> Result<Json<Contact>, ApiError> {
    let contact = state
        .contacts
        .get(&OwnerScope::for_user(&user), &contact_id)
        .await?;
    Ok(Json(contact))
}

pub async fn create_contact(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(req): ValidatedJson<NewContact>,
) -> Result<(StatusCode, Json<Contact>), ApiError> {
    let contact = state
        .contacts
        .create(&OwnerScope::for_user(&user), req)
        .await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

pub async fn update_contact(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(contact_id): Path<String>,
    ValidatedJson(changes): ValidatedJson<ContactChanges>,
) -> Result<Json<Contact>, ApiError> {
    let contact = state
        .contacts
        .update(&OwnerScope::for_user(&user), &contact_id, changes)
        .await?;
    Ok(Json(contact))
}

pub async fn update_favorite(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(contact_id): Path<String>,
    ValidatedJson(req): ValidatedJson<FavoriteRequest>,
) -> Result<Json<Contact>, ApiError> {
    let contact = state
        .contacts
        .set_favorite(&OwnerScope::for_user(&user), &contact_id, req.favorite)
        .await?;
    Ok(Json(contact))
}

pub async fn delete_contact(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(contact_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .contacts
        .delete(&OwnerScope::for_user(&user), &contact_id)
        .await?;
    Ok(Json(MessageResponse::new("contact deleted")))
}
