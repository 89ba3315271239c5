//! One-time migration from the legacy flat key layout.
//!
//! Version `2.1.10` stored every setting as a top-level key
//! (`cooldownMinutes`, `NPCIDs`, ...). Current documents nest them under
//! `Settings`. Absence of a legacy document is an ordinary outcome, not an
//! error — the host simply starts from defaults.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

use crate::{CURRENT_VERSION, ConfigData, LEGACY_VERSION, Settings};

/// The outcome of inspecting a raw config document.
#[derive(Debug, Clone, PartialEq)]
pub enum Migration {
    /// The document already uses the current layout.
    Current(ConfigData),
    /// A legacy flat document was lifted into the current layout; the
    /// result should be written back.
    Migrated(ConfigData),
    /// No usable document existed; these are the defaults, worth writing
    /// so operators get a file to edit.
    Fresh(ConfigData),
}

impl Migration {
    pub fn into_config(self) -> ConfigData {
        match self {
            Self::Current(c) | Self::Migrated(c) | Self::Fresh(c) => c,
        }
    }

    /// Whether the document changed and should be persisted.
    pub fn needs_write(&self) -> bool {
        !matches!(self, Self::Current(_))
    }
}

/// Inspects a raw config document and returns it in the current layout.
///
/// `raw` is whatever the host's config file produced, or `None` when no
/// file exists yet.
pub fn upgrade(raw: Option<&Value>) -> Migration {
    let Some(raw) = raw else {
        return Migration::Fresh(ConfigData::default());
    };

    match raw.get("VERSION").and_then(Value::as_str) {
        None => Migration::Fresh(ConfigData::default()),
        Some(LEGACY_VERSION) => {
            info!(from = LEGACY_VERSION, to = CURRENT_VERSION, "migrating legacy config");
            Migration::Migrated(lift_legacy(raw))
        }
        Some(version) => match serde_json::from_value::<ConfigData>(raw.clone()) {
            Ok(mut config) => {
                config.settings = config.settings.validated();
                Migration::Current(config)
            }
            Err(err) => {
                warn!(%version, %err, "unreadable config document — starting fresh");
                Migration::Fresh(ConfigData::default())
            }
        },
    }
}

fn lift_legacy(raw: &Value) -> ConfigData {
    let settings = Settings {
        cooldown_minutes: legacy(raw, "cooldownMinutes", 5.0),
        refund_ratio: legacy(raw, "refundRatio", 0.5),
        radiation_max: legacy(raw, "radiationMax", 1.0),
        npc_only: legacy(raw, "NPCOnly", false),
        npc_ids: legacy(raw, "NPCIDs", Vec::new()),
        recyclable_types: legacy(raw, "recyclableTypes", Settings::stock_recyclable()),
        blacklist: legacy(raw, "blacklist", Vec::new()),
        allowed_in_safe_zones: legacy(raw, "allowSafeZone", true),
        // Introduced after the flat layout; legacy servers ran timed-only.
        instant_recycling: false,
    };

    ConfigData {
        settings: settings.validated(),
        version: CURRENT_VERSION.to_string(),
    }
}

/// Reads one legacy top-level key, falling back to `default` when the key
/// is absent or holds a value of the wrong shape.
fn legacy<T: DeserializeOwned>(raw: &Value, key: &str, default: T) -> T {
    raw.get(key)
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or(default)
}

// =========================================================================
// Tests
// =========================================================================
