//! Capability traits for the services Reclaim consumes.
//!
//! The world engine, permission storage, and chat delivery are all external
//! systems. Reclaim talks to each through a trait so that production wires
//! in the real host adapter while tests wire in an in-memory mock — the
//! same seam the session layer's `Authenticator` pattern gives auth.

use crate::{EntityId, PlayerId, PlayerState, Position};

/// How a session's processing loop should run once started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingMode {
    /// The engine's standard start signal; it paces the loop itself.
    Timed,
    /// A repeating step every engine update, bypassing the standard pacing.
    Instant,
}

/// Everything the session layer asks the world engine to do.
///
/// Implementations wrap the host's entity/networking layer. All mutating
/// calls on ids the engine no longer knows must be silent no-ops — the
/// registry routinely races entity death and relies on that.
pub trait WorldApi {
    /// Creates and spawns an entity from a named template. `None` if the
    /// spawn failed (bad template, world shutting down).
    fn spawn_entity(&mut self, template: &str, pos: Position) -> Option<EntityId>;

    /// Destroys the entity. No-op for dead or unknown ids.
    fn kill_entity(&mut self, id: EntityId);

    /// Whether the entity is still alive in the world. Deferred callbacks
    /// check this before touching their target.
    fn entity_exists(&self, id: EntityId) -> bool;

    /// Locks or unlocks the entity against interaction by non-owners.
    fn set_locked(&mut self, id: EntityId, locked: bool);

    /// Whether the entity is included in world saves. Session entities are
    /// ephemeral and must never persist across a server restart.
    fn set_persistent(&mut self, id: EntityId, persistent: bool);

    /// Sets the resource-yield ratio on a recycler entity.
    fn set_recycle_efficiency(&mut self, id: EntityId, ratio: f32);

    fn position_of(&self, id: EntityId) -> Option<Position>;

    fn set_position(&mut self, id: EntityId, pos: Position);

    /// Flushes the entity's state to observers immediately.
    fn push_network_update(&mut self, id: EntityId);

    /// Number of item stacks in the entity's container (0 for entities
    /// without one).
    fn item_count(&self, id: EntityId) -> usize;

    /// Moves the entire contents of one container into another.
    fn transfer_contents(&mut self, from: EntityId, to: EntityId);

    /// Tags a drop container with the player it belongs to.
    fn set_container_owner(&mut self, id: EntityId, owner: PlayerId);

    /// Sets the loot panel shown when the container is opened.
    fn set_loot_panel(&mut self, id: EntityId, panel: &str);

    /// Whether the entity's processing loop is currently running.
    fn is_processing(&self, id: EntityId) -> bool;

    /// Starts the entity's processing loop in the given mode. Starting an
    /// already-running loop is a no-op.
    fn begin_processing(&mut self, id: EntityId, mode: ProcessingMode);

    /// A fresh snapshot of the player's physical/administrative state, or
    /// `None` if the player is not in the world.
    fn player_state(&self, player: PlayerId) -> Option<PlayerState>;

    /// The player's current position, if they are in the world.
    fn player_position(&self, player: PlayerId) -> Option<Position> {
        self.player_state(player).map(|s| s.position)
    }

    /// Clears the player's current loot focus. The per-player loot binding
    /// is exclusive, so this always precedes [`WorldApi::begin_looting`].
    fn end_looting(&mut self, player: PlayerId);

    /// Binds the entity as the player's active loot target and opens its
    /// panel. Returns `false` if the engine refused the binding.
    fn begin_looting(&mut self, player: PlayerId, target: EntityId) -> bool;

    /// Registers (or unregisters) the access gate's interest in
    /// perception decisions. Kept off while no session is live so the
    /// engine doesn't consult the gate per entity for nothing.
    fn set_perception_gating(&mut self, active: bool);
}

/// Permission storage, owned by the host platform.
pub trait Permissions {
    fn has(&self, player: PlayerId, permission: &str) -> bool;

    /// Declares a permission name so operators can grant it. Called once
    /// at plugin init.
    fn register(&mut self, permission: &str);
}

/// Chat delivery. The text Reclaim passes is its default-English rendering;
/// a localizing implementation may substitute its own translation.
pub trait Messenger {
    fn chat(&mut self, player: PlayerId, text: &str);
}

/// An external veto over session opening, consulted after every built-in
/// eligibility check has passed.
pub trait OpenHook {
    /// `Some(false)` vetoes the open; `Some(true)` and `None` both let it
    /// proceed (`None` meaning "no opinion").
    fn can_open(&self, player: PlayerId) -> Option<bool>;
}
