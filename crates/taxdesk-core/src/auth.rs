//! Session state.
//!
//! The auth context starts in `Loading`, resolves to `Unauthenticated` or
//! `Authenticated` once the stored session has been read, and moves between the
//! two on login and logout. There is no credential check beyond presence.

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::collections::get_document;
use crate::error::{Result, TaxdeskError};
use crate::storage::{KeyValueStore, Slot};

/// The logged-in user, persisted in the `demoUser` slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl User {
    /// Build a user whose id is derived from the email, so the same address
    /// always maps to the same activity history.
    pub fn from_email(email: &str, display_name: Option<String>) -> Self {
        let normalized = email.trim().to_lowercase();
        let id = Uuid::new_v5(&Uuid::NAMESPACE_URL, format!("mailto:{}", normalized).as_bytes());
        Self {
            id: id.to_string(),
            email: normalized,
            display_name: display_name.filter(|name| !name.trim().is_empty()),
        }
    }
}

/// Login form input.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Presence checks only.
    pub fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() {
            return Err(TaxdeskError::InvalidInput("Email is required".to_string()));
        }
        if self.password.is_empty() {
            return Err(TaxdeskError::InvalidInput("Password is required".to_string()));
        }
        Ok(())
    }
}

/// Registration form input.
#[derive(Debug, Clone)]
pub struct Registration {
    pub credentials: Credentials,
    pub first_name: String,
    pub last_name: String,
}

/// Authentication state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Loading,
    Unauthenticated,
    Authenticated(User),
}

impl AuthState {
    pub fn is_loading(&self) -> bool {
        matches!(self, AuthState::Loading)
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// Holder of the authentication state for one application instance.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    state: AuthState,
}

impl AuthContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the initial state from the `demoUser` slot.
    pub fn load<S: KeyValueStore + ?Sized>(&mut self, store: &S) {
        if let Ok(Some(raw)) = store.get_item(Slot::DemoUser.key()) {
            if serde_json::from_str::<User>(&raw).is_err() {
                warn!("stored session is unreadable; starting logged out");
            }
        }
        self.state = match get_document::<S, User>(store, Slot::DemoUser) {
            Some(user) => AuthState::Authenticated(user),
            None => AuthState::Unauthenticated,
        };
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn current_user(&self) -> Option<&User> {
        self.state.user()
    }

    /// The logged-in user, or `Unauthenticated`.
    pub fn require_user(&self) -> Result<&User> {
        self.current_user().ok_or(TaxdeskError::Unauthenticated)
    }

    pub(crate) fn set_user(&mut self, user: User) {
        self.state = AuthState::Authenticated(user);
    }

    pub(crate) fn clear(&mut self) {
        self.state = AuthState::Unauthenticated;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::set_document;
    use crate::storage::MemoryStore;

    #[test]
    fn test_user_id_is_stable_per_email() {
        let a = User::from_email("Alex@Example.com ", None);
        let b = User::from_email("alex@example.com", Some("Alex".to_string()));
        assert_eq!(a.id, b.id);
        assert_eq!(a.email, "alex@example.com");
        assert_ne!(a.id, User::from_email("sam@example.com", None).id);
    }

    #[test]
    fn test_blank_display_name_dropped() {
        let user = User::from_email("a@b.c", Some("  ".to_string()));
        assert!(user.display_name.is_none());
    }

    #[test]
    fn test_context_starts_loading() {
        let ctx = AuthContext::new();
        assert!(ctx.state().is_loading());
        assert!(matches!(ctx.require_user(), Err(TaxdeskError::Unauthenticated)));
    }

    #[test]
    fn test_load_resolves_state() {
        let mut store = MemoryStore::new();
        let mut ctx = AuthContext::new();
        ctx.load(&store);
        assert_eq!(ctx.state(), &AuthState::Unauthenticated);

        let user = User::from_email("a@b.c", None);
        set_document(&mut store, Slot::DemoUser, &user).unwrap();
        ctx.load(&store);
        assert_eq!(ctx.current_user(), Some(&user));
    }

    #[test]
    fn test_load_garbage_session_is_logged_out() {
        let mut store = MemoryStore::new();
        store.set_item("demoUser", "not-json").unwrap();
        let mut ctx = AuthContext::new();
        ctx.load(&store);
        assert_eq!(ctx.state(), &AuthState::Unauthenticated);
    }

    #[test]
    fn test_credentials_presence_checks() {
        assert!(Credentials::new("", "pw").validate().is_err());
        assert!(Credentials::new("a@b.c", "").validate().is_err());
        assert!(Credentials::new("a@b.c", "pw").validate().is_ok());
    }
}
