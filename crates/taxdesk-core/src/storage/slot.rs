//! Named storage slots.

use std::fmt;

/// Every slot the workspace reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Logged-in user (single object)
    DemoUser,
    /// Profile details (single object)
    UserProfile,
    /// Notification toggles (single object)
    NotificationSettings,
    Returns,
    Documents,
    Invoices,
    Receipts,
    Activities,
}

impl Slot {
    pub const ALL: [Slot; 8] = [
        Slot::DemoUser,
        Slot::UserProfile,
        Slot::NotificationSettings,
        Slot::Returns,
        Slot::Documents,
        Slot::Invoices,
        Slot::Receipts,
        Slot::Activities,
    ];

    /// Storage key for this slot.
    pub fn key(&self) -> &'static str {
        match self {
            Slot::DemoUser => "demoUser",
            Slot::UserProfile => "userProfile",
            Slot::NotificationSettings => "notificationSettings",
            Slot::Returns => "returns",
            Slot::Documents => "documents",
            Slot::Invoices => "invoices",
            Slot::Receipts => "receipts",
            Slot::Activities => "activities",
        }
    }

    /// Look up a slot by its storage key.
    pub fn from_key(key: &str) -> Option<Slot> {
        Slot::ALL.iter().copied().find(|slot| slot.key() == key)
    }

    /// Whether the slot holds an ordered sequence rather than a single object.
    pub fn is_collection(&self) -> bool {
        !matches!(
            self,
            Slot::DemoUser | Slot::UserProfile | Slot::NotificationSettings
        )
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
