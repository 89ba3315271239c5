//! Identity, position, and item types shared by every Reclaim crate.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A stable player identity, assigned by the host platform.
///
/// `#[serde(transparent)]` keeps the JSON form a plain number, so ids in
/// the config document and in logs stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// An opaque handle to a networked world entity.
///
/// The world engine assigns these at spawn time. Reclaim only stores them
/// as map keys and must tolerate the underlying entity dying at any time —
/// a held `EntityId` is a claim ticket, not ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A world-space position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// This position lifted `dy` units straight up.
    ///
    /// Session entities spawn far above their owner and leftover bags spawn
    /// just above them, so this is the only vector math the core needs.
    pub fn raised(self, dy: f32) -> Self {
        Self {
            y: self.y + dy,
            ..self
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1}, {:.1})", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// The host platform's item categories.
///
/// The recyclable-category allowlist in the config document stores these by
/// name, so the set and spelling must match the platform's category names
/// exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemCategory {
    Ammunition,
    Attire,
    Common,
    Component,
    Construction,
    Electrical,
    Food,
    Fun,
    Items,
    Medical,
    Misc,
    Resources,
    Tool,
    Traps,
    Weapon,
}

impl ItemCategory {
    /// The platform's name for this category, as used in the config
    /// allowlist.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ammunition => "Ammunition",
            Self::Attire => "Attire",
            Self::Common => "Common",
            Self::Component => "Component",
            Self::Construction => "Construction",
            Self::Electrical => "Electrical",
            Self::Food => "Food",
            Self::Fun => "Fun",
            Self::Items => "Items",
            Self::Medical => "Medical",
            Self::Misc => "Misc",
            Self::Resources => "Resources",
            Self::Tool => "Tool",
            Self::Traps => "Traps",
            Self::Weapon => "Weapon",
        }
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A stack of items proposed for (or sitting in) a container slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// The platform's short type identifier (e.g. `"rope"`, `"explosive.timed"`).
    /// The config blacklist matches against this.
    pub shortname: String,
    pub category: ItemCategory,
    pub amount: u32,
}

impl Item {
    pub fn new(shortname: impl Into<String>, category: ItemCategory) -> Self {
        Self {
            shortname: shortname.into(),
            category,
            amount: 1,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
