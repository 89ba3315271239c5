//! The session registry: creates, tracks, and destroys recycler sessions
//! and their leftover bags.

use std::collections::HashMap;

use reclaim_config::Settings;
use reclaim_policy::ItemFilter;
use reclaim_world::{EntityId, Item, PlayerId, ProcessingMode, WorldApi};
use tracing::{debug, info, warn};

use crate::{SessionError, WorldQueue};

/// Template for the recycler entity a session is built around.
pub const RECYCLER_TEMPLATE: &str = "assets/bundled/prefabs/static/recycler_static.prefab";

/// Template for the drop container that receives leftovers.
pub const BAG_TEMPLATE: &str = "assets/prefabs/misc/item drop/item_drop_backpack.prefab";

/// Loot panel shown when a leftover bag is opened.
const BAG_PANEL: &str = "smallwoodbox";

/// Session entities spawn far above their owner so they never collide
/// with the world; players only ever see the loot panel, not the entity.
const SPAWN_RAISE: f32 = 4000.0;

/// Leftover bags spawn just above the owner's feet.
const BAG_RAISE: f32 = 1.0;

// ---------------------------------------------------------------------------
// Configuration and outcomes
// ---------------------------------------------------------------------------

/// Registry knobs derived from the config document at plugin start.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Resource-yield ratio applied to every spawned recycler.
    pub refund_ratio: f32,
    /// Start the processing loop on item insertion instead of waiting for
    /// the engine's timed start signal.
    pub instant_recycling: bool,
    /// Updates to wait before binding a fresh entity as the owner's loot
    /// target. The engine needs a moment after spawn before the entity is
    /// interactive.
    pub attach_delay_updates: u64,
}

impl RegistryConfig {
    /// Derives the registry's knobs from the config document.
    pub fn from_settings(settings: &Settings, attach_delay_updates: u64) -> Self {
        Self {
            refund_ratio: settings.refund_ratio,
            instant_recycling: settings.instant_recycling,
            attach_delay_updates,
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            refund_ratio: 0.5,
            instant_recycling: false,
            attach_delay_updates: 1,
        }
    }
}

/// What closing a session produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseOutcome {
    pub owner: PlayerId,
    /// The leftover bag spawned for unprocessed contents, if any.
    pub leftover: Option<EntityId>,
}

/// What opening a session produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOutcome {
    /// The freshly spawned session entity.
    pub entity: EntityId,
    /// The player's previous session, closed to make room.
    pub replaced: Option<CloseOutcome>,
}

/// Pre-acceptance decision for an item proposed for insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertVerdict {
    /// Not a session container; the registry has no opinion.
    Unrelated,
    Accept,
    /// The container must refuse the item. Carries the owner so the
    /// caller can tell them why.
    Reject { owner: PlayerId },
}

/// Post-insertion outcome for an item that landed in a session container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddedOutcome {
    /// Not a session container.
    Unrelated,
    /// Landed outside the input slots; nothing to do.
    Ignored,
    /// An ineligible item got in anyway; the processing start was
    /// skipped. Carries the owner for messaging.
    Invalid(PlayerId),
    /// A valid input-slot item; the processing loop was signaled.
    Started,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Owns the session and leftover-bag maps and the full lifecycle protocol.
///
/// ## Lifecycle
///
/// ```text
/// open() ──→ [live session] ──→ close()            (loot end, replacement,
///                 │                │                disconnect, shutdown)
///                 │                ├─→ leftover bag (contents non-empty)
///                 │                ▼
///                 │          gating off when last session closes
///                 ▼
///        deferred loot attach (queue task, cancel-safe)
/// ```
///
/// All operations are safe against stale ids: anything referencing an
/// entity the registry no longer tracks is a silent no-op.
pub struct SessionRegistry {
    /// Live sessions, keyed by session entity.
    sessions: HashMap<EntityId, PlayerId>,

    /// Reverse index, kept in sync with `sessions`. A player has at most
    /// one live session (key invariant).
    by_owner: HashMap<PlayerId, EntityId>,

    /// Leftover bags, keyed by bag entity.
    bags: HashMap<EntityId, PlayerId>,

    /// Whether the perception gate is registered with the engine.
    /// On only while at least one session is live.
    gating_active: bool,

    filter: ItemFilter,
    config: RegistryConfig,
}

impl SessionRegistry {
    pub fn new(config: RegistryConfig, filter: ItemFilter) -> Self {
        Self {
            sessions: HashMap::new(),
            by_owner: HashMap::new(),
            bags: HashMap::new(),
            gating_active: false,
            filter,
            config,
        }
    }

    // -- Lifecycle --------------------------------------------------------

    /// Opens a session for the player, replacing any session they already
    /// hold.
    ///
    /// The fresh entity is locked, excluded from saves, and bound to the
    /// player's loot focus after a short deferred delay. Perception gating
    /// turns on with the first live session.
    pub fn open(
        &mut self,
        world: &mut dyn WorldApi,
        queue: &mut WorldQueue,
        player: PlayerId,
    ) -> Result<OpenOutcome, SessionError> {
        let replaced = self
            .by_owner
            .get(&player)
            .copied()
            .and_then(|entity| self.close(world, entity));

        let state = world
            .player_state(player)
            .ok_or(SessionError::PlayerOffline(player))?;

        let entity = world
            .spawn_entity(RECYCLER_TEMPLATE, state.position.raised(SPAWN_RAISE))
            .ok_or(SessionError::SpawnFailed(player))?;
        world.set_recycle_efficiency(entity, self.config.refund_ratio);
        world.set_persistent(entity, false);
        world.set_locked(entity, true);

        if self.sessions.is_empty() && !self.gating_active {
            self.gating_active = true;
            world.set_perception_gating(true);
            debug!("perception gating activated");
        }

        // The engine can't bind a just-spawned entity as a loot target;
        // attach after a short delay, and only if it still exists then.
        queue.schedule(self.config.attach_delay_updates, move |w| {
            if !w.entity_exists(entity) {
                return;
            }
            w.end_looting(player);
            if !w.begin_looting(player, entity) {
                return;
            }
            w.push_network_update(entity);
        });

        self.sessions.insert(entity, player);
        self.by_owner.insert(player, entity);
        info!(%player, %entity, "session opened");

        Ok(OpenOutcome { entity, replaced })
    }

    /// Closes the session behind `entity`. `None` if the id is not a
    /// tracked session (already closed elsewhere — routine, silent).
    ///
    /// Unprocessed contents are dropped into a leftover bag at the owner
    /// before the entity dies. Gating turns off with the last session.
    pub fn close(&mut self, world: &mut dyn WorldApi, entity: EntityId) -> Option<CloseOutcome> {
        let owner = self.sessions.get(&entity).copied()?;

        let leftover = self.drop_contents(world, entity, owner);

        self.sessions.remove(&entity);
        if self.by_owner.get(&owner) == Some(&entity) {
            self.by_owner.remove(&owner);
        }
        world.kill_entity(entity);
        info!(%owner, %entity, "session closed");

        if self.sessions.is_empty() && self.gating_active {
            self.gating_active = false;
            world.set_perception_gating(false);
            debug!("perception gating deactivated");
        }

        Some(CloseOutcome { owner, leftover })
    }

    /// Closes every live session.
    ///
    /// Re-reads "first remaining" each round rather than iterating a
    /// snapshot — closing a session mutates the map mid-loop. Always
    /// leaves gating deactivated.
    pub fn close_all(&mut self, world: &mut dyn WorldApi) -> Vec<CloseOutcome> {
        let mut closed = Vec::new();
        while let Some(entity) = self.sessions.keys().next().copied() {
            if let Some(outcome) = self.close(world, entity) {
                closed.push(outcome);
            }
        }

        if self.gating_active {
            self.gating_active = false;
            world.set_perception_gating(false);
        }
        closed
    }

    /// Destroys every tracked leftover bag, independent of session state.
    /// Returns how many were purged.
    pub fn purge_bags(&mut self, world: &mut dyn WorldApi) -> usize {
        let mut purged = 0;
        while let Some(bag) = self.bags.keys().next().copied() {
            self.bags.remove(&bag);
            world.kill_entity(bag);
            purged += 1;
        }
        if purged > 0 {
            info!(purged, "leftover bags purged");
        }
        purged
    }

    /// A player disconnected: their session closes and every bag they own
    /// dies — including a bag the close itself just dropped. Nothing of
    /// theirs survives a disconnect.
    pub fn handle_disconnect(
        &mut self,
        world: &mut dyn WorldApi,
        player: PlayerId,
    ) -> Option<CloseOutcome> {
        let outcome = self
            .by_owner
            .get(&player)
            .copied()
            .and_then(|entity| self.close(world, entity));

        let owned: Vec<EntityId> = self
            .bags
            .iter()
            .filter(|&(_, &owner)| owner == player)
            .map(|(&bag, _)| bag)
            .collect();
        for bag in owned {
            self.bags.remove(&bag);
            world.kill_entity(bag);
            debug!(%player, %bag, "leftover bag destroyed on disconnect");
        }

        outcome
    }

    /// The owner stopped looting `entity`: if it is a session, it closes.
    pub fn handle_loot_end(
        &mut self,
        world: &mut dyn WorldApi,
        entity: EntityId,
    ) -> Option<CloseOutcome> {
        self.close(world, entity)
    }

    /// The engine killed an entity (a bag looted empty, an admin sweep).
    /// Tracked bags are forgotten; everything else is none of ours.
    pub fn handle_entity_killed(&mut self, entity: EntityId) {
        if self.bags.remove(&entity).is_some() {
            debug!(%entity, "leftover bag removed by engine kill");
        }
    }

    // -- Item flow --------------------------------------------------------

    /// Pre-acceptance checkpoint: may `item` enter `slot` of this
    /// container? Consulted by the engine *before* the insertion happens.
    pub fn review_insert(&self, entity: EntityId, item: &Item, slot: usize) -> InsertVerdict {
        let Some(&owner) = self.sessions.get(&entity) else {
            return InsertVerdict::Unrelated;
        };
        if self.filter.allows(item, slot) {
            InsertVerdict::Accept
        } else {
            debug!(%owner, shortname = %item.shortname, slot, "item insertion vetoed");
            InsertVerdict::Reject { owner }
        }
    }

    /// Post-insertion checkpoint: an item landed in the container.
    ///
    /// The engine reports "may this be added" and "this was added" as two
    /// independent events, so the same rule runs again here — an invalid
    /// item that slipped past the veto must not start the processing
    /// loop. A valid input-slot item starts it: immediately at full speed
    /// in instant mode (skipped if already running), otherwise through
    /// the engine's own timed start.
    pub fn handle_item_added(
        &mut self,
        world: &mut dyn WorldApi,
        entity: EntityId,
        item: &Item,
        slot: usize,
    ) -> AddedOutcome {
        let Some(&owner) = self.sessions.get(&entity) else {
            return AddedOutcome::Unrelated;
        };
        if slot >= reclaim_policy::INPUT_SLOTS {
            return AddedOutcome::Ignored;
        }
        if !self.filter.is_eligible(item) {
            warn!(%owner, shortname = %item.shortname, "invalid item in session container");
            return AddedOutcome::Invalid(owner);
        }

        if self.config.instant_recycling {
            if !world.is_processing(entity) {
                world.begin_processing(entity, ProcessingMode::Instant);
            }
        } else {
            world.begin_processing(entity, ProcessingMode::Timed);
        }
        AddedOutcome::Started
    }

    /// The engine is about to consume an item from this session.
    ///
    /// Processing throughput is computed relative to entity-to-owner
    /// proximity, and sessions spawn far above their owner — so the
    /// entity is moved onto the owner for the step and moved back one
    /// update later. Both halves revalidate existence first.
    pub fn handle_item_processing(
        &mut self,
        world: &mut dyn WorldApi,
        queue: &mut WorldQueue,
        entity: EntityId,
    ) {
        let Some(&owner) = self.sessions.get(&entity) else {
            return;
        };
        let (Some(entity_pos), Some(owner_pos)) =
            (world.position_of(entity), world.player_position(owner))
        else {
            return;
        };
        if entity_pos == owner_pos {
            return;
        }

        world.set_position(entity, owner_pos);
        world.push_network_update(entity);
        queue.next_update(move |w| {
            if !w.entity_exists(entity) {
                return;
            }
            w.set_position(entity, entity_pos);
            w.push_network_update(entity);
        });
    }

    // -- Lookups ----------------------------------------------------------

    pub fn is_session_entity(&self, entity: EntityId) -> bool {
        self.sessions.contains_key(&entity)
    }

    /// The owner of a tracked session entity.
    pub fn owner_of(&self, entity: EntityId) -> Option<PlayerId> {
        self.sessions.get(&entity).copied()
    }

    /// The player's live session entity, if they have one.
    pub fn session_of(&self, player: PlayerId) -> Option<EntityId> {
        self.by_owner.get(&player).copied()
    }

    pub fn is_bag(&self, entity: EntityId) -> bool {
        self.bags.contains_key(&entity)
    }

    pub fn bag_owner(&self, entity: EntityId) -> Option<PlayerId> {
        self.bags.get(&entity).copied()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn bag_count(&self) -> usize {
        self.bags.len()
    }

    /// Whether the perception gate is currently registered with the
    /// engine. Toggled only by this registry.
    pub fn gating_active(&self) -> bool {
        self.gating_active
    }

    pub(crate) fn session_owner_for_gate(&self, entity: EntityId) -> Option<PlayerId> {
        self.sessions.get(&entity).copied()
    }

    // -- Internals --------------------------------------------------------

    /// Drops a closing session's contents into a fresh bag at the owner.
    ///
    /// No bag for an empty container; no bag either when the owner has no
    /// position (already gone from the world) or the spawn fails — the
    /// contents die with the session in those cases.
    fn drop_contents(
        &mut self,
        world: &mut dyn WorldApi,
        entity: EntityId,
        owner: PlayerId,
    ) -> Option<EntityId> {
        if world.item_count(entity) == 0 {
            return None;
        }
        let Some(owner_pos) = world.player_position(owner) else {
            return None;
        };
        let Some(bag) = world.spawn_entity(BAG_TEMPLATE, owner_pos.raised(BAG_RAISE)) else {
            warn!(%owner, "bag spawn failed — leftover contents lost");
            return None;
        };

        world.set_persistent(bag, false);
        world.transfer_contents(entity, bag);
        world.set_loot_panel(bag, BAG_PANEL);
        world.set_container_owner(bag, owner);

        self.bags.insert(bag, owner);
        info!(%owner, %bag, "leftover bag dropped");
        Some(bag)
    }
}
