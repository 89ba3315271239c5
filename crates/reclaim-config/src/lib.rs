//! Configuration for Reclaim.
//!
//! The config document is owned by the host — reading it from and writing
//! it to disk is the host's job (see [`ConfigStore`]). This crate defines
//! the document's shape, its defaults, value clamping, and the one-time
//! migration from the legacy flat key layout to the current nested one.

mod migrate;
mod settings;

pub use migrate::{Migration, upgrade};
pub use settings::{CURRENT_VERSION, ConfigData, LEGACY_VERSION, Settings};

/// Persistence seam for the config document.
///
/// Implemented by the host's config file layer. Called when the plugin
/// mutates settings at runtime (NPC allowlist edits) and after a
/// migration produced a document worth writing back.
pub trait ConfigStore {
    fn persist(&mut self, config: &ConfigData);
}
