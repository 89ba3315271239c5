//! Session registry and access gate for Reclaim.
//!
//! The registry is the single owner of all per-player session state:
//!
//! - which recycler entity belongs to which player (and the reverse),
//! - which leftover bags exist and who may loot them,
//! - whether perception gating is currently registered with the engine.
//!
//! Every mutation enters through a registry method; the maps are never
//! shared. World access happens through `&mut dyn WorldApi` arguments,
//! and anything that must run later goes through a [`WorldQueue`] task —
//! the registry itself never blocks or sleeps.
//!
//! ```text
//! facade (commands, eligibility)   engine events (loot end, kills, items)
//!            │                                   │
//!            ▼                                   ▼
//!      SessionRegistry  ──── owns ────  sessions / bags / gating flag
//!            │
//!            ▼
//!      Access Gate (can_perceive / can_loot_bag)
//! ```

mod error;
mod gate;
mod registry;

pub use error::SessionError;
pub use gate::{Observer, Perception};
pub use registry::{
    AddedOutcome, BAG_TEMPLATE, CloseOutcome, InsertVerdict, OpenOutcome, RECYCLER_TEMPLATE,
    RegistryConfig, SessionRegistry,
};

use reclaim_tick::DeferredQueue;
use reclaim_world::WorldApi;

/// The deferred-task queue the registry schedules world work on.
pub type WorldQueue = DeferredQueue<dyn WorldApi>;
