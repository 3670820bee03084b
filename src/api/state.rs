//! Shared handler state

use std::sync::Arc;

use crate::{auth::UserService, avatars::AvatarStore, contacts::ContactService};

/// Services shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserService>,
    pub contacts: Arc<ContactService>,
    pub avatars: Arc<AvatarStore>,
}
