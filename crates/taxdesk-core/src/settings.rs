//! Account settings: profile, notification preferences, and sidebar helpers.

use std::fmt;
use std::str::FromStr;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::activity::{ActivityKind, NewActivity};
use crate::auth::User;
use crate::collections::{get_document, load_document, set_document};
use crate::error::{Result, TaxdeskError};
use crate::storage::{KeyValueStore, Slot};
use crate::workspace::Page;

/// Stored profile. Fields missing on disk read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Profile form input. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationSettings {
    pub email_notifications: bool,
    pub sms_notifications: bool,
    pub push_notifications: bool,
    pub marketing_emails: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email_notifications: true,
            sms_notifications: false,
            push_notifications: true,
            marketing_emails: false,
        }
    }
}

impl NotificationSettings {
    pub fn get(&self, kind: NotificationKind) -> bool {
        match kind {
            NotificationKind::Email => self.email_notifications,
            NotificationKind::Sms => self.sms_notifications,
            NotificationKind::Push => self.push_notifications,
            NotificationKind::Marketing => self.marketing_emails,
        }
    }

    pub fn set(&mut self, kind: NotificationKind, enabled: bool) {
        let flag = match kind {
            NotificationKind::Email => &mut self.email_notifications,
            NotificationKind::Sms => &mut self.sms_notifications,
            NotificationKind::Push => &mut self.push_notifications,
            NotificationKind::Marketing => &mut self.marketing_emails,
        };
        *flag = enabled;
    }
}

/// One notification toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Email,
    Sms,
    Push,
    Marketing,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 4] = [
        NotificationKind::Email,
        NotificationKind::Sms,
        NotificationKind::Push,
        NotificationKind::Marketing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Email => "email",
            NotificationKind::Sms => "sms",
            NotificationKind::Push => "push",
            NotificationKind::Marketing => "marketing",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NotificationKind::Email => "Email notifications",
            NotificationKind::Sms => "SMS notifications",
            NotificationKind::Push => "Push notifications",
            NotificationKind::Marketing => "Marketing emails",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = TaxdeskError;

    fn from_str(s: &str) -> Result<Self> {
        NotificationKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                TaxdeskError::InvalidInput(format!(
                    "Unknown notification \"{}\" (expected email, sms, push, marketing)",
                    s
                ))
            })
    }
}

fn has_full_name(profile: &UserProfile) -> bool {
    !profile.first_name.trim().is_empty() && !profile.last_name.trim().is_empty()
}

/// Two-letter avatar initials, falling back to the email's first letter, then `U`.
pub fn initials(profile: &UserProfile, user: Option<&User>) -> String {
    if has_full_name(profile) {
        return profile
            .first_name
            .trim()
            .chars()
            .take(1)
            .chain(profile.last_name.trim().chars().take(1))
            .flat_map(char::to_uppercase)
            .collect();
    }
    user.and_then(|u| u.email.chars().next())
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_else(|| "U".to_string())
}

/// Full name when both parts are set, otherwise the email, otherwise `User`.
pub fn display_name(profile: &UserProfile, user: Option<&User>) -> String {
    if has_full_name(profile) {
        return format!("{} {}", profile.first_name.trim(), profile.last_name.trim());
    }
    user.map(|u| u.email.clone())
        .filter(|email| !email.is_empty())
        .unwrap_or_else(|| "User".to_string())
}

/// The settings page for the logged-in user.
pub struct Settings<'a, S: KeyValueStore> {
    page: Page<'a, S>,
    latency: Duration,
}

impl<'a, S: KeyValueStore> Settings<'a, S> {
    pub(crate) fn new(page: Page<'a, S>, latency: Duration) -> Self {
        Self { page, latency }
    }

    /// Stored profile with the session email.
    pub fn profile(&self) -> UserProfile {
        let mut profile: UserProfile =
            get_document(&*self.page.store, Slot::UserProfile).unwrap_or_default();
        profile.email = self.page.user().email.clone();
        profile
    }

    pub fn save_profile(&mut self, update: ProfileUpdate) -> Result<UserProfile> {
        self.pause();
        let mut profile: UserProfile = load_document(&*self.page.store, Slot::UserProfile)?.unwrap_or_default();
        profile.email = self.page.user().email.clone();
        if let Some(first_name) = update.first_name {
            profile.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = update.last_name {
            profile.last_name = last_name.trim().to_string();
        }
        if let Some(phone) = update.phone {
            profile.phone = phone.trim().to_string();
        }
        profile.updated_at = Some(self.page.clock.now());
        set_document(&mut *self.page.store, Slot::UserProfile, &profile)?;

        self.page.log(NewActivity::new(
            ActivityKind::System,
            "Profile Updated",
            format!("Profile saved for {}", profile.email),
        ));
        Ok(profile)
    }

    pub fn notification_settings(&self) -> NotificationSettings {
        get_document(&*self.page.store, Slot::NotificationSettings).unwrap_or_default()
    }

    pub fn set_notification(&mut self, kind: NotificationKind, enabled: bool) -> Result<NotificationSettings> {
        self.pause();
        let mut settings: NotificationSettings =
            load_document(&*self.page.store, Slot::NotificationSettings)?.unwrap_or_default();
        settings.set(kind, enabled);
        set_document(&mut *self.page.store, Slot::NotificationSettings, &settings)?;
        debug!(notification = %kind, enabled, "notification preference saved");
        Ok(settings)
    }

    pub fn initials(&self) -> String {
        initials(&self.profile(), Some(self.page.user()))
    }

    pub fn display_name(&self) -> String {
        display_name(&self.profile(), Some(self.page.user()))
    }

    fn pause(&self) {
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
    }
}
