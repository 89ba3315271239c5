//! The configuration document.
//!
//! Field names under `Settings` are the operator-facing JSON keys and are
//! kept stable across versions — existing server configs must keep
//! loading unchanged.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Version written into freshly created and migrated documents.
pub const CURRENT_VERSION: &str = "3.0.0";

/// The last release that used the flat key layout. Documents carrying this
/// version are lifted by [`crate::upgrade`].
pub const LEGACY_VERSION: &str = "2.1.10";

// ---------------------------------------------------------------------------
// ConfigData
// ---------------------------------------------------------------------------

/// The full on-disk configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigData {
    #[serde(rename = "Settings")]
    pub settings: Settings,

    #[serde(rename = "VERSION")]
    pub version: String,
}

impl Default for ConfigData {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            version: CURRENT_VERSION.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Operator-tunable settings.
///
/// `#[serde(default)]` lets partial documents load — any key an operator
/// deleted falls back to its default instead of failing the parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Minutes a player must wait between session opens. `0` disables the
    /// cooldown entirely.
    #[serde(rename = "Cooldown (in minutes)")]
    pub cooldown_minutes: f32,

    /// Radiation exposure above which opening is denied. `0` disables the
    /// ceiling.
    #[serde(rename = "Maximum Radiation")]
    pub radiation_max: f32,

    /// Resource-yield ratio applied to every session's recycler.
    #[serde(rename = "Refund Ratio")]
    pub refund_ratio: f32,

    /// When set, the player command is disabled and sessions open only
    /// through allowlisted NPCs.
    #[serde(rename = "NPCs Only")]
    pub npc_only: bool,

    /// When cleared, players inside a safe zone are denied.
    #[serde(rename = "Allowed In Safe Zones")]
    pub allowed_in_safe_zones: bool,

    /// Start the processing loop the moment a valid item lands in an
    /// input slot, at full speed, instead of waiting for the engine's
    /// timed start.
    #[serde(rename = "Instant Recycling")]
    pub instant_recycling: bool,

    /// NPC identities that open a session when used. An empty list admits
    /// no NPC.
    #[serde(rename = "NPC Ids")]
    pub npc_ids: Vec<String>,

    /// Item categories accepted into the input slots.
    #[serde(rename = "Recyclable Types")]
    pub recyclable_types: Vec<String>,

    /// Item shortnames refused regardless of category.
    #[serde(rename = "Blacklisted Items")]
    pub blacklist: Vec<String>,
}

impl Settings {
    /// Categories a fresh install accepts.
    pub const STOCK_RECYCLABLE: [&'static str; 13] = [
        "Ammunition",
        "Attire",
        "Common",
        "Component",
        "Construction",
        "Electrical",
        "Fun",
        "Items",
        "Medical",
        "Misc",
        "Tool",
        "Traps",
        "Weapon",
    ];

    pub fn stock_recyclable() -> Vec<String> {
        Self::STOCK_RECYCLABLE.iter().map(|s| s.to_string()).collect()
    }

    /// Clamps out-of-range values so the settings are safe to use.
    ///
    /// Rules: negative cooldown/radiation become 0 (disabled), the refund
    /// ratio is clamped to `0.0..=1.0`.
    pub fn validated(mut self) -> Self {
        if self.cooldown_minutes < 0.0 {
            warn!(value = self.cooldown_minutes, "negative cooldown — disabling");
            self.cooldown_minutes = 0.0;
        }
        if self.radiation_max < 0.0 {
            warn!(value = self.radiation_max, "negative radiation ceiling — disabling");
            self.radiation_max = 0.0;
        }
        if !(0.0..=1.0).contains(&self.refund_ratio) {
            warn!(value = self.refund_ratio, "refund ratio out of range — clamping");
            self.refund_ratio = self.refund_ratio.clamp(0.0, 1.0);
        }
        self
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cooldown_minutes: 5.0,
            radiation_max: 1.0,
            refund_ratio: 0.5,
            npc_only: false,
            allowed_in_safe_zones: true,
            instant_recycling: false,
            npc_ids: Vec::new(),
            recyclable_types: Self::stock_recyclable(),
            blacklist: Vec::new(),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_document_round_trips_under_operator_keys() {
        let doc = ConfigData::default();
        let json = serde_json::to_value(&doc).unwrap();

        assert_eq!(json["VERSION"], CURRENT_VERSION);
        assert_eq!(json["Settings"]["Cooldown (in minutes)"], 5.0);
        assert_eq!(json["Settings"]["Refund Ratio"], 0.5);
        assert_eq!(json["Settings"]["Allowed In Safe Zones"], true);

        let back: ConfigData = serde_json::from_value(json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_partial_document_fills_missing_keys_with_defaults() {
        let json = serde_json::json!({
            "Settings": { "Cooldown (in minutes)": 2.5 },
            "VERSION": CURRENT_VERSION,
        });
        let doc: ConfigData = serde_json::from_value(json).unwrap();

        assert_eq!(doc.settings.cooldown_minutes, 2.5);
        assert_eq!(doc.settings.refund_ratio, 0.5);
        assert_eq!(doc.settings.recyclable_types, Settings::stock_recyclable());
    }

    #[test]
    fn test_validated_clamps_out_of_range_values() {
        let s = Settings {
            cooldown_minutes: -3.0,
            radiation_max: -1.0,
            refund_ratio: 7.5,
            ..Settings::default()
        }
        .validated();

        assert_eq!(s.cooldown_minutes, 0.0);
        assert_eq!(s.radiation_max, 0.0);
        assert_eq!(s.refund_ratio, 1.0);
    }

    #[test]
    fn test_validated_keeps_in_range_values() {
        let s = Settings::default().validated();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn test_stock_recyclable_excludes_raw_resources() {
        // Resources and Food yield nothing when recycled; a fresh install
        // must not accept them.
        let stock = Settings::stock_recyclable();
        assert!(!stock.contains(&"Resources".to_string()));
        assert!(!stock.contains(&"Food".to_string()));
        assert_eq!(stock.len(), 13);
    }
}
