//! The per-player reuse-timer table.

use std::collections::HashMap;
use std::fmt;

use reclaim_world::PlayerId;

/// Tracks when each player last opened a session.
///
/// Absence of an entry means "never used, not on cooldown". Entries are
/// overwritten on every successful open and never deleted — a stale entry
/// is harmless, the elapsed-time check neutralizes it.
///
/// The bypass grant is applied by callers: a holder simply never consults
/// this table.
#[derive(Debug, Default)]
pub struct Cooldowns {
    window_secs: u64,
    last_open: HashMap<PlayerId, u64>,
}

impl Cooldowns {
    /// A table with a window of `cooldown_minutes * 60` seconds.
    pub fn new(cooldown_minutes: f32) -> Self {
        Self {
            window_secs: (cooldown_minutes as f64 * 60.0) as u64,
            last_open: HashMap::new(),
        }
    }

    pub fn window_secs(&self) -> u64 {
        self.window_secs
    }

    /// Whether a cooldown window is configured at all.
    pub fn is_enabled(&self) -> bool {
        self.window_secs > 0
    }

    /// Records a successful open at `now` (unix epoch seconds).
    pub fn record_use(&mut self, owner: PlayerId, now: u64) {
        self.last_open.insert(owner, now);
    }

    /// Time left on the owner's cooldown, or `None` once
    /// `now >= last + window` (or if they never opened).
    pub fn remaining(&self, owner: PlayerId, now: u64) -> Option<CooldownLeft> {
        let last = *self.last_open.get(&owner)?;
        let until = last + self.window_secs;
        if now >= until {
            None
        } else {
            Some(CooldownLeft::from_secs(until - now))
        }
    }

    pub fn is_on_cooldown(&self, owner: PlayerId, now: u64) -> bool {
        self.remaining(owner, now).is_some()
    }
}

/// Remaining cooldown decomposed for display.
///
/// Renders as "3 minutes", "1 minute 30 seconds", "45 seconds" — zero
/// minutes are omitted, singular forms kick in at exactly 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownLeft {
    pub minutes: u64,
    pub seconds: u64,
}

impl CooldownLeft {
    pub fn from_secs(secs: u64) -> Self {
        Self {
            minutes: secs / 60,
            seconds: secs % 60,
        }
    }
}

impl fmt::Display for CooldownLeft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn unit(f: &mut fmt::Formatter<'_>, n: u64, name: &str) -> fmt::Result {
            if n == 1 {
                write!(f, "1 {name}")
            } else {
                write!(f, "{n} {name}s")
            }
        }

        if self.minutes == 0 {
            return unit(f, self.seconds, "second");
        }
        unit(f, self.minutes, "minute")?;
        if self.seconds > 0 {
            f.write_str(" ")?;
            unit(f, self.seconds, "second")?;
        }
        Ok(())
    }
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

    #[test]
    fn test_unused_player_is_not_on_cooldown() {
        let cd = Cooldowns::new(5.0);
        assert!(!cd.is_on_cooldown(pid(1), 1_000));
        assert_eq!(cd.remaining(pid(1), 1_000), None);
    }

    #[test]
    fn test_record_use_starts_the_window() {
        let mut cd = Cooldowns::new(5.0);
        cd.record_use(pid(1), 0);

        assert!(cd.is_on_cooldown(pid(1), 0));
        assert!(cd.is_on_cooldown(pid(1), 299));
    }

    #[test]
    fn test_window_expires_exactly_at_boundary() {
        let mut cd = Cooldowns::new(5.0);
        cd.record_use(pid(1), 0);

        assert!(cd.is_on_cooldown(pid(1), 299));
        assert!(!cd.is_on_cooldown(pid(1), 300));
        assert!(!cd.is_on_cooldown(pid(1), 301));
    }

    #[test]
    fn test_remaining_at_two_minutes_in_is_three_minutes() {
        // The 5-minute scenario: open at t=0, retry at t=120.
        let mut cd = Cooldowns::new(5.0);
        cd.record_use(pid(1), 0);

        let left = cd.remaining(pid(1), 120).unwrap();
        assert_eq!(left, CooldownLeft { minutes: 3, seconds: 0 });
        assert_eq!(left.to_string(), "3 minutes");
    }

    #[test]
    fn test_reopen_after_expiry_restarts_the_window() {
        let mut cd = Cooldowns::new(5.0);
        cd.record_use(pid(1), 0);
        assert!(!cd.is_on_cooldown(pid(1), 301));

        cd.record_use(pid(1), 301);
        assert!(cd.is_on_cooldown(pid(1), 302));
        assert!(!cd.is_on_cooldown(pid(1), 601));
    }

    #[test]
    fn test_zero_minute_window_never_cools_down() {
        let mut cd = Cooldowns::new(0.0);
        assert!(!cd.is_enabled());

        cd.record_use(pid(1), 100);
        assert!(!cd.is_on_cooldown(pid(1), 100));
    }

    #[test]
    fn test_players_cool_down_independently() {
        let mut cd = Cooldowns::new(5.0);
        cd.record_use(pid(1), 0);

        assert!(cd.is_on_cooldown(pid(1), 10));
        assert!(!cd.is_on_cooldown(pid(2), 10));
    }

    #[test]
    fn test_fractional_minutes_round_down_to_seconds() {
        let cd = Cooldowns::new(0.5);
        assert_eq!(cd.window_secs(), 30);
    }

    // -- Display ----------------------------------------------------------

    #[test]
    fn test_display_omits_zero_minutes() {
        assert_eq!(CooldownLeft::from_secs(45).to_string(), "45 seconds");
    }

    #[test]
    fn test_display_omits_zero_seconds_when_minutes_present() {
        assert_eq!(CooldownLeft::from_secs(180).to_string(), "3 minutes");
    }

    #[test]
    fn test_display_combines_minutes_and_seconds() {
        assert_eq!(CooldownLeft::from_secs(90).to_string(), "1 minute 30 seconds");
    }

    #[test]
    fn test_display_singular_forms_at_one() {
        assert_eq!(CooldownLeft::from_secs(61).to_string(), "1 minute 1 second");
        assert_eq!(CooldownLeft::from_secs(1).to_string(), "1 second");
    }
}
