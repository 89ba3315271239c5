//! Player state snapshots read by the eligibility rules.

use crate::Position;

/// Vehicle/structure categories a player can be parented to.
///
/// Each maps to its own denial reason, so the set is closed rather than a
/// free-form string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentKind {
    CargoShip,
    HotAirBalloon,
    Elevator,
}

/// A point-in-time snapshot of a player's physical and administrative
/// state, as reported by the world engine.
///
/// Player state changes every tick, so snapshots are fetched fresh on each
/// open attempt and never cached. Absence of a snapshot (the engine returns
/// `None`) means the player is not in the world right now.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub position: Position,
    pub is_dead: bool,
    pub is_wounded: bool,
    pub is_swimming: bool,
    /// Not grounded: falling, flying, or mid-air.
    pub is_airborne: bool,
    /// Seated in any vehicle or mount.
    pub is_mounted: bool,
    pub is_admin: bool,
    pub radiation_level: f32,
    pub has_build_privilege: bool,
    pub in_safe_zone: bool,
    /// The vehicle/structure the player is currently parented to, if any.
    pub parent: Option<ParentKind>,
}

impl Default for PlayerState {
    /// A grounded, healthy player standing at the origin with build
    /// privilege — the baseline that passes every physical check.
    fn default() -> Self {
        Self {
            position: Position::default(),
            is_dead: false,
            is_wounded: false,
            is_swimming: false,
            is_airborne: false,
            is_mounted: false,
            is_admin: false,
            radiation_level: 0.0,
            has_build_privilege: true,
            in_safe_zone: false,
            parent: None,
        }
    }
}
