//! The access gate: per-observer perception and loot decisions.
//!
//! The engine consults the gate on every relevant networking event while
//! gating is active. Decisions are pure map lookups against the registry —
//! never a type inspection of the underlying entity.

use reclaim_world::{EntityId, PlayerId};

use crate::SessionRegistry;

/// A perception decision.
///
/// `Abstain` defers to the engine's default visibility policy; the gate
/// only ever speaks up about entities it tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Perception {
    Allow,
    Deny,
    Abstain,
}

/// The observing player as the engine presents them: their identity, their
/// own entity (players are entities too), and whether they hold admin
/// status, which exempts them from gating entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observer {
    pub player: PlayerId,
    pub entity: EntityId,
    pub is_admin: bool,
}

impl SessionRegistry {
    /// May `observer` perceive `entity`?
    ///
    /// Abstains for missing parties, self-observation, and admins. For a
    /// tracked session entity the owner — and only the owner — is
    /// allowed. Everything else is not ours to decide.
    pub fn can_perceive(
        &self,
        entity: Option<EntityId>,
        observer: Option<&Observer>,
    ) -> Perception {
        let (Some(entity), Some(observer)) = (entity, observer) else {
            return Perception::Abstain;
        };
        if observer.entity == entity || observer.is_admin {
            return Perception::Abstain;
        }
        match self.session_owner_for_gate(entity) {
            Some(owner) if owner == observer.player => Perception::Allow,
            Some(_) => Perception::Deny,
            None => Perception::Abstain,
        }
    }

    /// May `observer` loot `bag`?
    ///
    /// A tracked leftover bag admits only its owner. Untracked entities
    /// are out of scope and always allowed.
    pub fn can_loot_bag(&self, observer: PlayerId, bag: EntityId) -> bool {
        match self.bag_owner(bag) {
            Some(owner) => owner == observer,
            None => true,
        }
    }
}
