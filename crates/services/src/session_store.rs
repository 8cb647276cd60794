use std::sync::Arc;

use aula_core::model::{UserProfile, UserType};
use storage::repository::KeyValueStore;
use tracing::info;

use crate::persistence::{load_snapshot, remove_snapshot, save_snapshot};

/// Storage key of the signed-in profile.
pub const SESSION_KEY: &str = "app_user_data";

/// Who is using the app right now.
///
/// `user_type` can be set before any profile exists so a role picked on the
/// home screen survives until authentication finishes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub current_user: Option<UserProfile>,
    pub user_type: Option<UserType>,
    pub has_account: bool,
}

/// Session/identity store mirrored to durable storage.
///
/// Only the profile is persisted; it is written by [`SessionStore::set_user`]
/// and deleted by [`SessionStore::logout`]. The in-memory state is
/// authoritative whether or not the write succeeds.
pub struct SessionStore {
    state: SessionState,
    records: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    /// Empty session without reading storage.
    #[must_use]
    pub fn new(records: Arc<dyn KeyValueStore>) -> Self {
        Self {
            state: SessionState::default(),
            records,
        }
    }

    /// Rehydrates from the persisted profile, falling back to an empty session.
    pub async fn load(records: Arc<dyn KeyValueStore>) -> Self {
        let mut store = Self::new(records);
        if let Some(user) = load_snapshot::<UserProfile>(store.records.as_ref(), SESSION_KEY).await
        {
            info!(user_id = %user.id(), "restored session");
            store.state.user_type = Some(user.user_type());
            store.state.current_user = Some(user);
        }
        store
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn current_user(&self) -> Option<&UserProfile> {
        self.state.current_user.as_ref()
    }

    #[must_use]
    pub fn user_type(&self) -> Option<UserType> {
        self.state.user_type
    }

    #[must_use]
    pub fn has_account(&self) -> bool {
        self.state.has_account
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.current_user.is_some()
    }

    /// Replaces the profile, takes its role, and persists it.
    pub async fn set_user(&mut self, user: UserProfile) {
        info!(user_id = %user.id(), user_type = %user.user_type(), "signed in");
        self.state.user_type = Some(user.user_type());
        save_snapshot(self.records.as_ref(), SESSION_KEY, &user).await;
        self.state.current_user = Some(user);
    }

    /// Remembers a role choice. Leaves the profile and storage untouched.
    pub fn set_user_type(&mut self, user_type: UserType) {
        self.state.user_type = Some(user_type);
    }

    pub fn set_has_account(&mut self, has_account: bool) {
        self.state.has_account = has_account;
    }

    /// Clears every field and deletes the persisted profile.
    pub async fn logout(&mut self) {
        if let Some(user) = &self.state.current_user {
            info!(user_id = %user.id(), "signed out");
        }
        self.state = SessionState::default();
        remove_snapshot(self.records.as_ref(), SESSION_KEY).await;
    }
}
