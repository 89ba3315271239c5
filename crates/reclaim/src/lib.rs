//! # Reclaim
//!
//! Per-player recycling-station sessions for multiplayer worlds.
//!
//! Each player may hold at most one exclusive recycler session: they feed
//! it disposable items, the world engine converts those to resource
//! yields, and whatever is left when the session ends drops in a bag only
//! they can loot. Reclaim owns the bookkeeping — session and bag
//! registries, per-player cooldowns, item eligibility, and the
//! visibility/loot gate — while the world engine keeps owning entities,
//! physics, and networking.
//!
//! ## Embedding
//!
//! The host implements [`Host`] (world access, permissions, chat, clock)
//! and forwards its engine events into a [`RecyclePlugin`]:
//!
//! ```ignore
//! let mut plugin = RecyclePlugin::load(raw_config.as_ref(), UpdateRate(10), Some(store));
//! plugin.init(&mut host);
//! // per engine update:
//! plugin.on_update(&mut host);
//! // player command:
//! plugin.cmd_open(&mut host, player);
//! ```

mod host;
mod messages;
mod plugin;
pub mod telemetry;

pub use host::Host;
pub use messages::Notice;
pub use plugin::{
    ADMIN_PERMISSION, BYPASS_PERMISSION, OPEN_COMMAND, PURGE_BAGS_COMMAND,
    PURGE_SESSIONS_COMMAND, RecyclePlugin, USE_PERMISSION,
};

// The types an embedding host works with directly.
pub use reclaim_config::{ConfigData, ConfigStore, Migration, Settings, upgrade};
pub use reclaim_policy::{CooldownLeft, DenyReason};
pub use reclaim_session::{Observer, Perception};
pub use reclaim_tick::{FrameClock, UpdateRate};
pub use reclaim_world::{
    EntityId, Item, ItemCategory, Messenger, OpenHook, ParentKind, Permissions, PlayerId,
    PlayerState, Position, ProcessingMode, WorldApi,
};
