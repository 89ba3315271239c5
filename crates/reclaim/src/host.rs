//! The seam between the plugin and its host environment.

use reclaim_world::{Messenger, Permissions, WorldApi};

/// Everything the plugin needs from its embedding environment, bundled so
/// plugin entry points take one argument instead of four.
///
/// Production implements this over the live engine adapters; tests
/// implement it over in-memory mocks. The clock is part of the seam so
/// cooldown behavior is testable without waiting.
pub trait Host {
    fn world(&mut self) -> &mut (dyn WorldApi + 'static);

    fn permissions(&mut self) -> &mut dyn Permissions;

    fn messenger(&mut self) -> &mut dyn Messenger;

    /// Current unix time in whole seconds.
    fn now(&self) -> u64;
}
