//! The plugin surface: commands, engine event forwarders, and the query
//! API an embedding host calls.

use std::time::Duration;

use reclaim_config::{ConfigData, ConfigStore, upgrade};
use reclaim_policy::{Cooldowns, DenyReason, Grants, ItemFilter};
use reclaim_session::{
    AddedOutcome, CloseOutcome, InsertVerdict, Observer, Perception, RegistryConfig,
    SessionRegistry, WorldQueue,
};
use reclaim_tick::{DeferredQueue, UpdateRate};
use reclaim_world::{EntityId, Item, OpenHook, PlayerId};
use serde_json::Value;
use tracing::{info, warn};

use crate::{Host, Notice};

/// Grants use of the player open command.
pub const USE_PERMISSION: &str = "recycle.use";

/// Grants the admin surface: purge commands, plus opening regardless of
/// the use permission.
pub const ADMIN_PERMISSION: &str = "recycle.admin";

/// Exempts the holder from the reuse cooldown.
pub const BYPASS_PERMISSION: &str = "recycle.bypass";

/// Command names the host's dispatcher should bind. The open command is
/// expected to be reachable from both chat and console.
pub const OPEN_COMMAND: &str = "recycle";
pub const PURGE_SESSIONS_COMMAND: &str = "purgerecyclers";
pub const PURGE_BAGS_COMMAND: &str = "purgebags";

/// Delay before a fresh session entity is bound as its owner's loot
/// target. The engine needs this long after a spawn before the entity
/// accepts a loot binding.
const ATTACH_DELAY: Duration = Duration::from_millis(200);

/// The recycling-station plugin.
///
/// One instance per server. Owns all session state and the deferred-task
/// queue; reaches everything else through the [`Host`] passed into each
/// call.
pub struct RecyclePlugin {
    config: ConfigData,
    registry: SessionRegistry,
    cooldowns: Cooldowns,
    queue: WorldQueue,
    hooks: Vec<Box<dyn OpenHook>>,
    store: Option<Box<dyn ConfigStore>>,
}

impl RecyclePlugin {
    /// Builds a plugin from an already-current config document.
    pub fn new(config: ConfigData, rate: UpdateRate) -> Self {
        let config = ConfigData {
            settings: config.settings.validated(),
            version: config.version,
        };
        let registry = SessionRegistry::new(
            RegistryConfig::from_settings(&config.settings, rate.updates_in(ATTACH_DELAY)),
            ItemFilter::from_settings(&config.settings),
        );
        let cooldowns = Cooldowns::new(config.settings.cooldown_minutes);

        Self {
            config,
            registry,
            cooldowns,
            queue: DeferredQueue::new(),
            hooks: Vec::new(),
            store: None,
        }
    }

    /// Builds a plugin from whatever raw config document the host read
    /// from disk (or `None` for a first run), migrating legacy layouts.
    ///
    /// When the migration produced a document worth keeping — a lifted
    /// legacy config or fresh defaults — it is written back through
    /// `store` immediately.
    pub fn load(
        raw: Option<&Value>,
        rate: UpdateRate,
        store: Option<Box<dyn ConfigStore>>,
    ) -> Self {
        let migration = upgrade(raw);
        let needs_write = migration.needs_write();
        let config = migration.into_config();

        let mut plugin = Self::new(config, rate);
        plugin.store = store;
        if needs_write {
            plugin.persist_config();
        }
        plugin
    }

    /// Registers an external veto over session opening, consulted after
    /// every built-in check has passed.
    pub fn add_open_hook(&mut self, hook: Box<dyn OpenHook>) {
        self.hooks.push(hook);
    }

    pub fn config(&self) -> &ConfigData {
        &self.config
    }

    // -- Lifecycle --------------------------------------------------------

    /// Declares the plugin's permissions and makes sure perception gating
    /// starts deactivated. Call once when the host loads the plugin.
    pub fn init(&mut self, host: &mut dyn Host) {
        let permissions = host.permissions();
        permissions.register(USE_PERMISSION);
        permissions.register(ADMIN_PERMISSION);
        permissions.register(BYPASS_PERMISSION);

        host.world().set_perception_gating(false);
        info!("recycle plugin initialized");
    }

    /// Tears down every session and bag. Call when the host unloads the
    /// plugin.
    pub fn shutdown(&mut self, host: &mut dyn Host) {
        let world = host.world();
        self.registry.close_all(world);
        self.registry.purge_bags(world);
        info!("recycle plugin shut down");
    }

    /// Runs deferred work that became due. Call once per engine update.
    pub fn on_update(&mut self, host: &mut dyn Host) {
        self.queue.run_due(host.world());
    }

    // -- Opening ----------------------------------------------------------

    /// Full eligibility check with user-facing messaging: either the
    /// player may open right now, or they just received exactly one chat
    /// line saying why not.
    pub fn can_player_open(&self, host: &mut dyn Host, player: PlayerId) -> bool {
        match self.evaluate_open(host, player) {
            Ok(()) => true,
            Err(reason) => {
                host.messenger().chat(player, &reason.to_string());
                false
            }
        }
    }

    /// Opens a session for the player with no eligibility check,
    /// replacing any session they already hold. API surface for trusted
    /// callers; the command path checks eligibility first.
    pub fn open_session(&mut self, host: &mut dyn Host, player: PlayerId) {
        match self.registry.open(host.world(), &mut self.queue, player) {
            Ok(outcome) => {
                if let Some(closed) = outcome.replaced {
                    self.notify_leftover(host, &closed);
                }
            }
            Err(err) => warn!(%player, %err, "session open failed"),
        }
    }

    /// The player-facing open command (chat or console).
    ///
    /// Silently unavailable in NPC-only mode. A successful open records
    /// cooldown use whenever a cooldown is configured — bypass holders
    /// included, their exemption lives in the check, not the record.
    pub fn cmd_open(&mut self, host: &mut dyn Host, player: PlayerId) {
        if self.config.settings.npc_only {
            return;
        }
        if !self.can_player_open(host, player) {
            return;
        }
        self.open_session(host, player);
        if self.cooldowns.is_enabled() {
            let now = host.now();
            self.cooldowns.record_use(player, now);
        }
    }

    /// A player used an NPC. Opens directly — NPC-driven opens skip the
    /// eligibility chain and the cooldown — but only for explicitly
    /// allowlisted NPC identities. An empty allowlist admits none.
    pub fn on_npc_use(&mut self, host: &mut dyn Host, npc_id: &str, player: PlayerId) {
        if !self.config.settings.npc_ids.iter().any(|id| id == npc_id) {
            return;
        }
        self.open_session(host, player);
    }

    // -- Admin commands ---------------------------------------------------

    /// Admin command: close every live session.
    pub fn cmd_purge_sessions(&mut self, host: &mut dyn Host, caller: PlayerId) {
        if !self.can_manage_sessions(host, caller) {
            host.messenger().chat(caller, &DenyReason::NoPermission.to_string());
            return;
        }
        let closed = self.registry.close_all(host.world());
        for outcome in &closed {
            self.notify_leftover(host, outcome);
        }
        host.messenger().chat(caller, Notice::SessionsPurged.text());
    }

    /// Admin command: destroy every leftover bag.
    pub fn cmd_purge_bags(&mut self, host: &mut dyn Host, caller: PlayerId) {
        if !self.can_manage_sessions(host, caller) {
            host.messenger().chat(caller, &DenyReason::NoPermission.to_string());
            return;
        }
        self.registry.purge_bags(host.world());
        host.messenger().chat(caller, Notice::BagsPurged.text());
    }

    // -- Engine event forwarders ------------------------------------------

    /// Pre-acceptance checkpoint for an item proposed for insertion.
    /// `false` means the container must refuse it (the owner has been
    /// told); `true` means no objection.
    pub fn allows_insert(
        &mut self,
        host: &mut dyn Host,
        entity: EntityId,
        item: &Item,
        slot: usize,
    ) -> bool {
        match self.registry.review_insert(entity, item, slot) {
            InsertVerdict::Reject { owner } => {
                host.messenger().chat(owner, Notice::InvalidItem.text());
                false
            }
            InsertVerdict::Accept | InsertVerdict::Unrelated => true,
        }
    }

    /// Post-insertion checkpoint: an item landed in a container.
    pub fn on_item_added(
        &mut self,
        host: &mut dyn Host,
        entity: EntityId,
        item: &Item,
        slot: usize,
    ) {
        let outcome = self
            .registry
            .handle_item_added(host.world(), entity, item, slot);
        if let AddedOutcome::Invalid(owner) = outcome {
            host.messenger().chat(owner, Notice::InvalidItem.text());
        }
    }

    /// The engine is about to consume an item from a container.
    pub fn on_item_processing(&mut self, host: &mut dyn Host, entity: EntityId) {
        self.registry
            .handle_item_processing(host.world(), &mut self.queue, entity);
    }

    /// A player stopped looting an entity.
    pub fn on_loot_end(&mut self, host: &mut dyn Host, entity: EntityId) {
        if let Some(outcome) = self.registry.handle_loot_end(host.world(), entity) {
            self.notify_leftover(host, &outcome);
        }
    }

    /// A player disconnected from the server.
    pub fn on_player_disconnected(&mut self, host: &mut dyn Host, player: PlayerId) {
        self.registry.handle_disconnect(host.world(), player);
    }

    /// The engine killed an entity.
    pub fn on_entity_killed(&mut self, entity: EntityId) {
        self.registry.handle_entity_killed(entity);
    }

    /// Perception decision for the engine's visibility pipeline.
    pub fn can_perceive(
        &self,
        entity: Option<EntityId>,
        observer: Option<&Observer>,
    ) -> Perception {
        self.registry.can_perceive(entity, observer)
    }

    /// Loot-access decision for drop containers.
    pub fn can_loot(&self, observer: PlayerId, entity: EntityId) -> bool {
        self.registry.can_loot_bag(observer, entity)
    }

    // -- Query API --------------------------------------------------------

    pub fn is_session_entity(&self, entity: EntityId) -> bool {
        self.registry.is_session_entity(entity)
    }

    pub fn session_owner(&self, entity: EntityId) -> Option<PlayerId> {
        self.registry.owner_of(entity)
    }

    pub fn session_of(&self, player: PlayerId) -> Option<EntityId> {
        self.registry.session_of(player)
    }

    /// Whether the player is currently on cooldown. Always false for
    /// bypass holders, regardless of recorded timestamps.
    pub fn is_on_cooldown(&self, host: &mut dyn Host, player: PlayerId) -> bool {
        if self.can_bypass_cooldown(host, player) {
            return false;
        }
        self.cooldowns.is_on_cooldown(player, host.now())
    }

    pub fn can_use_session(&self, host: &mut dyn Host, player: PlayerId) -> bool {
        host.permissions().has(player, USE_PERMISSION)
    }

    pub fn can_manage_sessions(&self, host: &mut dyn Host, player: PlayerId) -> bool {
        host.permissions().has(player, ADMIN_PERMISSION)
    }

    pub fn can_bypass_cooldown(&self, host: &mut dyn Host, player: PlayerId) -> bool {
        host.permissions().has(player, BYPASS_PERMISSION)
    }

    /// Adds an NPC identity to the allowlist and persists the config.
    pub fn add_allowed_npc(&mut self, id: &str) {
        self.config.settings.npc_ids.push(id.to_string());
        self.persist_config();
    }

    /// Removes an NPC identity from the allowlist; persists only if it
    /// was present.
    pub fn remove_allowed_npc(&mut self, id: &str) {
        let before = self.config.settings.npc_ids.len();
        self.config.settings.npc_ids.retain(|npc| npc != id);
        if self.config.settings.npc_ids.len() != before {
            self.persist_config();
        }
    }

    // -- Internals --------------------------------------------------------

    fn evaluate_open(&self, host: &mut dyn Host, player: PlayerId) -> Result<(), DenyReason> {
        let permissions = host.permissions();
        let grants = Grants {
            can_use: permissions.has(player, USE_PERMISSION),
            can_manage: permissions.has(player, ADMIN_PERMISSION),
            can_bypass_cooldown: permissions.has(player, BYPASS_PERMISSION),
        };
        let now = host.now();
        let state = host.world().player_state(player);

        reclaim_policy::check_open(
            state.as_ref(),
            &grants,
            &self.config.settings,
            &self.cooldowns,
            player,
            now,
        )?;

        for hook in &self.hooks {
            if hook.can_open(player) == Some(false) {
                return Err(DenyReason::Vetoed);
            }
        }
        Ok(())
    }

    fn notify_leftover(&mut self, host: &mut dyn Host, outcome: &CloseOutcome) {
        if outcome.leftover.is_some() {
            host.messenger()
                .chat(outcome.owner, Notice::LeftoverDropped.text());
        }
    }

    fn persist_config(&mut self) {
        if let Some(store) = &mut self.store {
            store.persist(&self.config);
        }
    }
}
