//! Chat notices the plugin sends outside the denial path.
//!
//! Denials carry their text on `DenyReason` itself; these are the
//! remaining player-facing lines. Localizing hosts can switch on
//! [`Notice::key`] instead of using the default English text.

/// A non-denial chat notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// Unprocessed items were moved into a leftover bag.
    LeftoverDropped,
    /// An item failed the recyclability filter.
    InvalidItem,
    /// Admin purge of all sessions completed.
    SessionsPurged,
    /// Admin purge of all leftover bags completed.
    BagsPurged,
}

impl Notice {
    pub fn text(&self) -> &'static str {
        match self {
            Self::LeftoverDropped => "You left some items in the recycler!",
            Self::InvalidItem => "You cannot recycle that!",
            Self::SessionsPurged => "All recyclers have been destroyed",
            Self::BagsPurged => "All bags have been destroyed",
        }
    }

    /// Stable message key for localizing collaborators.
    pub fn key(&self) -> &'static str {
        match self {
            Self::LeftoverDropped => "session.leftovers",
            Self::InvalidItem => "session.invalid-item",
            Self::SessionsPurged => "admin.sessions-purged",
            Self::BagsPurged => "admin.bags-purged",
        }
    }
}
