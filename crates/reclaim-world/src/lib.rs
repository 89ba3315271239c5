//! World-facing types and collaborator traits for Reclaim.
//!
//! Reclaim never owns the world simulation. The crates above this one hold
//! *keys* into the world (entity and player ids) and call into it through
//! the capability traits defined here:
//!
//! 1. **Types** — identity newtypes, positions, items, and the
//!    [`PlayerState`] snapshot the eligibility rules read.
//! 2. **[`WorldApi`]** — everything the session layer asks the engine to do
//!    (spawn/kill entities, toggle flags, bind loot targets, start the
//!    processing loop).
//! 3. **Side collaborators** — [`Permissions`], [`Messenger`], [`OpenHook`].
//!
//! # How it fits in the stack
//!
//! ```text
//! reclaim (facade)          ← public plugin surface
//!     ↕
//! reclaim-session / -policy ← registry, gate, eligibility
//!     ↕
//! reclaim-world (this crate) ← ids, snapshots, capability traits
//! ```

mod state;
mod types;
mod world;

pub use state::{ParentKind, PlayerState};
pub use types::{EntityId, Item, ItemCategory, PlayerId, Position};
pub use world::{Messenger, OpenHook, Permissions, ProcessingMode, WorldApi};
