//! Workspace facade.
//!
//! A [`Workspace`] owns the key-value store, the clock, and the auth context for
//! one application instance. Feature pages are only reachable through it with
//! a logged-in session, so page code never sees a missing user.

use std::time::Duration;

use tracing::{info, warn};

use crate::activity::{append_activity, ActivityKind, ActivityLog, ActivityMetadata, NewActivity};
use crate::auth::{AuthContext, Credentials, Registration, User};
use crate::clock::{Clock, SystemClock};
use crate::collections::{remove_document, set_document};
use crate::dashboard::{summarize, DashboardSummary};
use crate::documents::Documents;
use crate::error::Result;
use crate::payments::Payments;
use crate::returns::{Returns, TransitionPolicy};
use crate::settings::{Settings, UserProfile};
use crate::storage::{KeyValueStore, Slot};

/// Borrowed view handed to a feature page: the store, the clock, the
/// logged-in user, and the client stamped onto activity entries.
pub struct Page<'a, S: KeyValueStore> {
    pub(crate) store: &'a mut S,
    pub(crate) clock: &'a dyn Clock,
    pub(crate) user: &'a User,
    pub(crate) client: Option<&'a ActivityMetadata>,
}

impl<'a, S: KeyValueStore> Page<'a, S> {
    /// Append one activity entry for a mutation that has already been written.
    ///
    /// A failed activity write is logged and does not undo the mutation.
    pub(crate) fn log(&mut self, mut activity: NewActivity) {
        if activity.metadata.is_none() {
            if let Some(client) = self.client {
                activity = activity.with_metadata(client.clone());
            }
        }
        let description = activity.description.clone();
        if let Err(err) = append_activity(&mut *self.store, self.clock, &self.user.id, activity) {
            warn!(activity = %description, error = %err, "activity write failed; mutation kept");
        }
    }

    pub(crate) fn user(&self) -> &User {
        self.user
    }
}

/// One application instance over a key-value store.
pub struct Workspace<S: KeyValueStore> {
    store: S,
    clock: Box<dyn Clock>,
    auth: AuthContext,
    policy: TransitionPolicy,
    save_latency: Duration,
    client: Option<ActivityMetadata>,
}

impl<S: KeyValueStore> Workspace<S> {
    /// Open a workspace on `store` using wall-clock time.
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }

    /// Open a workspace with an explicit clock.
    pub fn with_clock(store: S, clock: impl Clock + 'static) -> Self {
        let mut auth = AuthContext::new();
        auth.load(&store);
        Self {
            store,
            clock: Box::new(clock),
            auth,
            policy: TransitionPolicy::default(),
            save_latency: Duration::ZERO,
            client: None,
        }
    }

    /// Set the tax-return status transition policy.
    pub fn with_policy(mut self, policy: TransitionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the artificial pause applied before settings saves.
    pub fn with_save_latency(mut self, latency: Duration) -> Self {
        self.save_latency = latency;
        self
    }

    /// Identify the client; attached as metadata to every activity entry.
    pub fn with_client(mut self, client: ActivityMetadata) -> Self {
        self.client = Some(client);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    pub fn clock(&self) -> &dyn Clock {
        &*self.clock
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    /// Start a session. Any existing session is replaced.
    pub fn login(&mut self, credentials: &Credentials, display_name: Option<String>) -> Result<User> {
        credentials.validate()?;
        let user = User::from_email(&credentials.email, display_name);
        set_document(&mut self.store, Slot::DemoUser, &user)?;
        self.auth.set_user(user.clone());
        info!(user = %user.id, "logged in");

        self.page()?.log(NewActivity::new(
            ActivityKind::Auth,
            "User Logged In",
            format!("Signed in as {}", user.email),
        ));
        Ok(user)
    }

    /// Create an account: stores the profile, then starts a session.
    pub fn register(&mut self, registration: &Registration) -> Result<User> {
        registration.credentials.validate()?;
        let display_name = format!(
            "{} {}",
            registration.first_name.trim(),
            registration.last_name.trim()
        );
        let user = User::from_email(&registration.credentials.email, Some(display_name.trim().to_string()));

        let profile = UserProfile {
            first_name: registration.first_name.trim().to_string(),
            last_name: registration.last_name.trim().to_string(),
            email: user.email.clone(),
            phone: String::new(),
            updated_at: Some(self.clock.now()),
        };
        set_document(&mut self.store, Slot::UserProfile, &profile)?;
        set_document(&mut self.store, Slot::DemoUser, &user)?;
        self.auth.set_user(user.clone());
        info!(user = %user.id, "registered");

        self.page()?.log(NewActivity::new(
            ActivityKind::Auth,
            "Account Created",
            format!("Registered {}", user.email),
        ));
        Ok(user)
    }

    /// End the session. Logging out while logged out is a no-op.
    pub fn logout(&mut self) -> Result<()> {
        let Some(user) = self.auth.current_user().cloned() else {
            return Ok(());
        };
        self.page()?.log(NewActivity::new(
            ActivityKind::Auth,
            "User Logged Out",
            format!("Signed out {}", user.email),
        ));
        remove_document(&mut self.store, Slot::DemoUser)?;
        self.auth.clear();
        info!(user = %user.id, "logged out");
        Ok(())
    }

    /// Remove every slot, including the session.
    pub fn delete_account(&mut self) -> Result<()> {
        let user = self.auth.require_user()?.id.clone();
        for slot in Slot::ALL {
            self.store.remove_item(slot.key())?;
        }
        self.auth.clear();
        info!(user = %user, "account deleted");
        Ok(())
    }

    fn page(&mut self) -> Result<Page<'_, S>> {
        let user = self.auth.require_user()?;
        Ok(Page {
            store: &mut self.store,
            clock: &*self.clock,
            user,
            client: self.client.as_ref(),
        })
    }

    pub fn returns(&mut self) -> Result<Returns<'_, S>> {
        let policy = self.policy;
        Ok(Returns::new(self.page()?, policy))
    }

    pub fn documents(&mut self) -> Result<Documents<'_, S>> {
        Ok(Documents::new(self.page()?))
    }

    pub fn payments(&mut self) -> Result<Payments<'_, S>> {
        Ok(Payments::new(self.page()?))
    }

    pub fn activity(&mut self) -> Result<ActivityLog<'_, S>> {
        Ok(ActivityLog::new(self.page()?))
    }

    pub fn settings(&mut self) -> Result<Settings<'_, S>> {
        let latency = self.save_latency;
        Ok(Settings::new(self.page()?, latency))
    }

    pub fn dashboard(&mut self) -> Result<DashboardSummary> {
        Ok(summarize(self.page()?))
    }
}
