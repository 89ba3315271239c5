//! Policy layer for Reclaim: who may open a session, when, and with what.
//!
//! Three independent pieces, all pure over explicit inputs:
//!
//! 1. **Eligibility** — [`check_open`] folds a player's current world
//!    state, grants, and settings into the first applicable
//!    [`DenyReason`], or passes.
//! 2. **Cooldowns** — [`Cooldowns`] is the per-player reuse-timer table.
//!    Time is an explicit `now` in unix epoch seconds, so tests never
//!    sleep.
//! 3. **Item filter** — [`ItemFilter`] decides which items the input
//!    slots accept.
//!
//! Nothing here talks to the world or sends messages; the facade owns the
//! side effects.

mod cooldown;
mod eligibility;
mod filter;

pub use cooldown::{CooldownLeft, Cooldowns};
pub use eligibility::{DenyReason, Grants, check_open};
pub use filter::{INPUT_SLOTS, ItemFilter};
