//! The precondition chain gating session creation.

use reclaim_config::Settings;
use reclaim_world::{ParentKind, PlayerId, PlayerState};
use tracing::debug;

use crate::{CooldownLeft, Cooldowns};

/// The caller's permission grants, resolved before the check so the chain
/// itself stays pure.
#[derive(Debug, Clone, Copy, Default)]
pub struct Grants {
    pub can_use: bool,
    pub can_manage: bool,
    pub can_bypass_cooldown: bool,
}

/// Why an open attempt was denied.
///
/// One variant per failing condition; the `Display` text is the
/// default-English chat line. The facade's localization key for each is
/// [`DenyReason::key`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DenyReason {
    /// The player is missing from the world or incapacitated.
    #[error("You can't recycle right now")]
    Incapacitated,

    #[error("You don't have permission to do that")]
    NoPermission,

    /// Carries the formatted remaining time.
    #[error("You need to wait {0} before recycling")]
    OnCooldown(CooldownLeft),

    #[error("You cannot recycle while wounded")]
    Wounded,

    #[error("You cannot recycle within someone's building privilege")]
    NoBuildPrivilege,

    #[error("You cannot recycle while irradiated")]
    Irradiated,

    #[error("You cannot recycle while swimming")]
    Swimming,

    #[error("You cannot recycle while falling")]
    Airborne,

    #[error("You cannot recycle while mounted")]
    Mounted,

    #[error("You cannot recycle while on a ship")]
    OnShip,

    #[error("You cannot recycle while on a balloon")]
    OnBalloon,

    #[error("You cannot recycle while on an elevator")]
    OnElevator,

    #[error("You cannot recycle while in a safe zone")]
    InSafeZone,

    /// An external hook vetoed the open. Deliberately shares its chat
    /// line with [`DenyReason::Incapacitated`] — the player is told the
    /// same unspecific "not right now" either way.
    #[error("You can't recycle right now")]
    Vetoed,
}

impl DenyReason {
    /// Stable message key for localizing collaborators.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Incapacitated => "denied.incapacitated",
            Self::NoPermission => "denied.permission",
            Self::OnCooldown(_) => "cooldown.active",
            Self::Wounded => "denied.wounded",
            Self::NoBuildPrivilege => "denied.privilege",
            Self::Irradiated => "denied.irradiated",
            Self::Swimming => "denied.swimming",
            Self::Airborne => "denied.falling",
            Self::Mounted => "denied.mounted",
            Self::OnShip => "denied.ship",
            Self::OnBalloon => "denied.balloon",
            Self::OnElevator => "denied.elevator",
            Self::InSafeZone => "denied.safe-zone",
            Self::Vetoed => "denied.vetoed",
        }
    }
}

/// Evaluates every open precondition in fixed priority order,
/// short-circuiting at the first failure.
///
/// `state` is a fresh snapshot — player state changes every tick, so
/// nothing here may be cached between attempts. The external veto hook is
/// not part of this chain; the facade consults it only after this passes,
/// so hooks never observe attempts that were already doomed.
pub fn check_open(
    state: Option<&PlayerState>,
    grants: &Grants,
    settings: &Settings,
    cooldowns: &Cooldowns,
    owner: PlayerId,
    now: u64,
) -> Result<(), DenyReason> {
    let result = evaluate(state, grants, settings, cooldowns, owner, now);
    if let Err(reason) = &result {
        debug!(player = %owner, reason = reason.key(), "open denied");
    }
    result
}

fn evaluate(
    state: Option<&PlayerState>,
    grants: &Grants,
    settings: &Settings,
    cooldowns: &Cooldowns,
    owner: PlayerId,
    now: u64,
) -> Result<(), DenyReason> {
    let Some(state) = state else {
        return Err(DenyReason::Incapacitated);
    };
    if state.is_dead {
        return Err(DenyReason::Incapacitated);
    }
    if !grants.can_use && !grants.can_manage {
        return Err(DenyReason::NoPermission);
    }
    if settings.cooldown_minutes > 0.0 && !grants.can_bypass_cooldown {
        if let Some(left) = cooldowns.remaining(owner, now) {
            return Err(DenyReason::OnCooldown(left));
        }
    }
    if state.is_wounded {
        return Err(DenyReason::Wounded);
    }
    if !state.has_build_privilege {
        return Err(DenyReason::NoBuildPrivilege);
    }
    if settings.radiation_max > 0.0 && state.radiation_level > settings.radiation_max {
        return Err(DenyReason::Irradiated);
    }
    if state.is_swimming {
        return Err(DenyReason::Swimming);
    }
    if state.is_airborne {
        return Err(DenyReason::Airborne);
    }
    if state.is_mounted {
        return Err(DenyReason::Mounted);
    }
    match state.parent {
        Some(ParentKind::CargoShip) => return Err(DenyReason::OnShip),
        Some(ParentKind::HotAirBalloon) => return Err(DenyReason::OnBalloon),
        Some(ParentKind::Elevator) => return Err(DenyReason::OnElevator),
        None => {}
    }
    if !settings.allowed_in_safe_zones && state.in_safe_zone {
        return Err(DenyReason::InSafeZone);
    }
    Ok(())
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(id: u64) -> PlayerId {
        PlayerId(id)
    }

    fn full_grants() -> Grants {
        Grants {
            can_use: true,
            can_manage: false,
            can_bypass_cooldown: false,
        }
    }

    fn check(state: &PlayerState, grants: &Grants, settings: &Settings) -> Result<(), DenyReason> {
        check_open(Some(state), grants, settings, &Cooldowns::new(0.0), pid(1), 0)
    }

    #[test]
    fn test_baseline_player_passes() {
        let ok = check(&PlayerState::default(), &full_grants(), &Settings::default());
        assert_eq!(ok, Ok(()));
    }

    #[test]
    fn test_missing_player_cannot_act() {
        let result = check_open(
            None,
            &full_grants(),
            &Settings::default(),
            &Cooldowns::new(0.0),
            pid(1),
            0,
        );
        assert_eq!(result, Err(DenyReason::Incapacitated));
    }

    #[test]
    fn test_dead_player_cannot_act() {
        let state = PlayerState {
            is_dead: true,
            ..PlayerState::default()
        };
        assert_eq!(
            check(&state, &full_grants(), &Settings::default()),
            Err(DenyReason::Incapacitated)
        );
    }

    #[test]
    fn test_no_grants_is_denied() {
        let result = check(&PlayerState::default(), &Grants::default(), &Settings::default());
        assert_eq!(result, Err(DenyReason::NoPermission));
    }

    #[test]
    fn test_manage_grant_substitutes_for_use() {
        let grants = Grants {
            can_manage: true,
            ..Grants::default()
        };
        assert_eq!(check(&PlayerState::default(), &grants, &Settings::default()), Ok(()));
    }

    #[test]
    fn test_active_cooldown_is_denied_with_remaining_time() {
        let mut cooldowns = Cooldowns::new(5.0);
        cooldowns.record_use(pid(1), 0);

        let result = check_open(
            Some(&PlayerState::default()),
            &full_grants(),
            &Settings::default(),
            &cooldowns,
            pid(1),
            120,
        );
        assert_eq!(
            result,
            Err(DenyReason::OnCooldown(CooldownLeft { minutes: 3, seconds: 0 }))
        );
    }

    #[test]
    fn test_expired_cooldown_passes() {
        let mut cooldowns = Cooldowns::new(5.0);
        cooldowns.record_use(pid(1), 0);

        let result = check_open(
            Some(&PlayerState::default()),
            &full_grants(),
            &Settings::default(),
            &cooldowns,
            pid(1),
            301,
        );
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn test_bypass_grant_ignores_active_cooldown() {
        let mut cooldowns = Cooldowns::new(5.0);
        cooldowns.record_use(pid(1), 0);
        let grants = Grants {
            can_use: true,
            can_bypass_cooldown: true,
            ..Grants::default()
        };

        let result = check_open(
            Some(&PlayerState::default()),
            &grants,
            &Settings::default(),
            &cooldowns,
            pid(1),
            1,
        );
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn test_disabled_cooldown_is_never_checked() {
        let mut cooldowns = Cooldowns::new(5.0);
        cooldowns.record_use(pid(1), 0);
        let settings = Settings {
            cooldown_minutes: 0.0,
            ..Settings::default()
        };

        let result = check_open(
            Some(&PlayerState::default()),
            &full_grants(),
            &settings,
            &cooldowns,
            pid(1),
            1,
        );
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn test_each_physical_condition_maps_to_its_reason() {
        let base = PlayerState::default();
        let cases = [
            (PlayerState { is_wounded: true, ..base.clone() }, DenyReason::Wounded),
            (
                PlayerState { has_build_privilege: false, ..base.clone() },
                DenyReason::NoBuildPrivilege,
            ),
            (PlayerState { is_swimming: true, ..base.clone() }, DenyReason::Swimming),
            (PlayerState { is_airborne: true, ..base.clone() }, DenyReason::Airborne),
            (PlayerState { is_mounted: true, ..base.clone() }, DenyReason::Mounted),
            (
                PlayerState { parent: Some(ParentKind::CargoShip), ..base.clone() },
                DenyReason::OnShip,
            ),
            (
                PlayerState { parent: Some(ParentKind::HotAirBalloon), ..base.clone() },
                DenyReason::OnBalloon,
            ),
            (
                PlayerState { parent: Some(ParentKind::Elevator), ..base.clone() },
                DenyReason::OnElevator,
            ),
        ];

        for (state, expected) in cases {
            assert_eq!(check(&state, &full_grants(), &Settings::default()), Err(expected));
        }
    }

    #[test]
    fn test_radiation_ceiling_applies_only_when_configured() {
        let hot = PlayerState {
            radiation_level: 25.0,
            ..PlayerState::default()
        };

        let ceiling_on = Settings { radiation_max: 1.0, ..Settings::default() };
        assert_eq!(
            check(&hot, &full_grants(), &ceiling_on),
            Err(DenyReason::Irradiated)
        );

        let ceiling_off = Settings { radiation_max: 0.0, ..Settings::default() };
        assert_eq!(check(&hot, &full_grants(), &ceiling_off), Ok(()));
    }

    #[test]
    fn test_safe_zone_restriction_applies_only_when_configured() {
        let zoned = PlayerState {
            in_safe_zone: true,
            ..PlayerState::default()
        };

        assert_eq!(check(&zoned, &full_grants(), &Settings::default()), Ok(()));

        let restricted = Settings {
            allowed_in_safe_zones: false,
            ..Settings::default()
        };
        assert_eq!(
            check(&zoned, &full_grants(), &restricted),
            Err(DenyReason::InSafeZone)
        );
    }

    #[test]
    fn test_priority_order_first_failure_wins() {
        // Wounded outranks swimming; permission outranks both.
        let state = PlayerState {
            is_wounded: true,
            is_swimming: true,
            ..PlayerState::default()
        };
        assert_eq!(
            check(&state, &full_grants(), &Settings::default()),
            Err(DenyReason::Wounded)
        );
        assert_eq!(
            check(&state, &Grants::default(), &Settings::default()),
            Err(DenyReason::NoPermission)
        );
    }

    #[test]
    fn test_denial_texts_match_the_chat_lines() {
        assert_eq!(
            DenyReason::Swimming.to_string(),
            "You cannot recycle while swimming"
        );
        assert_eq!(
            DenyReason::OnCooldown(CooldownLeft { minutes: 3, seconds: 0 }).to_string(),
            "You need to wait 3 minutes before recycling"
        );
        assert_eq!(
            DenyReason::Vetoed.to_string(),
            DenyReason::Incapacitated.to_string()
        );
    }
}
