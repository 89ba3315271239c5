//! Update pump and deferred one-shot callbacks for Reclaim.
//!
//! The session layer runs entirely on the world engine's update thread, but
//! two of its steps cannot run synchronously: binding a freshly spawned
//! entity as a player's loot target (the engine needs a short delay before
//! the entity is interactive) and restoring an entity's position one update
//! after the relocation trick. [`DeferredQueue`] models both as explicit
//! single-shot tasks counted in updates.
//!
//! [`FrameClock`] is the pump that paces a host loop at a fixed update
//! rate when Reclaim is embedded somewhere without its own loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* host commands */ }
//!         info = clock.wait_for_update() => {
//!             plugin.on_update(&mut host);
//!         }
//!     }
//! }
//! ```
//!
//! With `rate_hz == 0` the clock never fires and the embedding engine is
//! expected to call into the queue on its own updates.

use std::time::Duration;

use rand::Rng;
use tokio::time::{self, Instant as TokioInstant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Update rate
// ---------------------------------------------------------------------------

/// A fixed update rate in Hz. `0` means externally driven — the embedding
/// engine calls [`DeferredQueue::run_due`] from its own loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateRate(pub u32);

impl UpdateRate {
    /// Maximum supported update rate.
    pub const MAX_HZ: u32 = 128;

    /// Duration of one update. `None` when externally driven.
    pub fn update_duration(&self) -> Option<Duration> {
        if self.0 == 0 {
            None
        } else {
            Some(Duration::from_secs_f64(1.0 / self.0 as f64))
        }
    }

    /// How many updates cover the given wall-clock delay, rounded up.
    ///
    /// Never returns 0: a delay shorter than one update still takes one.
    /// When externally driven the update length is unknown, so any delay
    /// collapses to a single update.
    pub fn updates_in(&self, delay: Duration) -> u64 {
        if self.0 == 0 {
            return 1;
        }
        let updates = (delay.as_secs_f64() * self.0 as f64).ceil() as u64;
        updates.max(1)
    }

    /// Clamps an out-of-range rate so the value is safe to use.
    pub fn validated(self) -> Self {
        if self.0 > Self::MAX_HZ {
            warn!(
                rate = self.0,
                max = Self::MAX_HZ,
                "update rate exceeds maximum — clamping"
            );
            Self(Self::MAX_HZ)
        } else {
            self
        }
    }
}

// ---------------------------------------------------------------------------
// Deferred one-shot tasks
// ---------------------------------------------------------------------------

struct Task<C: ?Sized> {
    remaining: u64,
    run: Box<dyn FnOnce(&mut C)>,
}

/// Update-counted one-shot callbacks over a context `C`.
///
/// Tasks fire in [`run_due`](Self::run_due) after their update count
/// elapses, in scheduling order. There is no cancellation handle: a task
/// whose target died in the meantime is expected to check
/// `entity_exists` itself and return without effect. The scheduling layer
/// guarantees nothing about target lifetime.
pub struct DeferredQueue<C: ?Sized> {
    tasks: Vec<Task<C>>,
}

impl<C: ?Sized> DeferredQueue<C> {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Schedules `f` to run after `after_updates` calls to `run_due`.
    ///
    /// `0` is treated as `1` — a task never runs in the update that
    /// scheduled it.
    pub fn schedule(&mut self, after_updates: u64, f: impl FnOnce(&mut C) + 'static) {
        let remaining = after_updates.max(1);
        trace!(after_updates = remaining, pending = self.tasks.len() + 1, "task scheduled");
        self.tasks.push(Task {
            remaining,
            run: Box::new(f),
        });
    }

    /// Schedules `f` for the very next update.
    pub fn next_update(&mut self, f: impl FnOnce(&mut C) + 'static) {
        self.schedule(1, f);
    }

    /// Advances every pending task by one update and runs the ones that
    /// became due. Returns how many ran.
    pub fn run_due(&mut self, ctx: &mut C) -> usize {
        for task in &mut self.tasks {
            task.remaining -= 1;
        }

        let mut due = Vec::new();
        let mut i = 0;
        while i < self.tasks.len() {
            if self.tasks[i].remaining == 0 {
                due.push(self.tasks.remove(i));
            } else {
                i += 1;
            }
        }

        let ran = due.len();
        for task in due {
            (task.run)(ctx);
        }
        if ran > 0 {
            trace!(ran, pending = self.tasks.len(), "deferred tasks ran");
        }
        ran
    }

    /// Number of tasks still waiting.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl<C: ?Sized> Default for DeferredQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Frame clock
// ---------------------------------------------------------------------------

/// Information about a fired update, returned by
/// [`FrameClock::wait_for_update`].
#[derive(Debug, Clone)]
pub struct UpdateInfo {
    /// Monotonically increasing update number (starts at 1).
    pub update: u64,
    /// Fixed delta time (always `1 / rate`).
    pub dt: Duration,
    /// `true` if this update fired late and the clock skipped ahead.
    pub overrun: bool,
}

/// Fixed-timestep update pump.
///
/// One `FrameClock` per embedded host loop. Overruns are handled by
/// skipping ahead — the next update is scheduled from *now*, never from
/// the missed deadline, so a stall can't cause a catch-up burst.
pub struct FrameClock {
    rate: UpdateRate,
    update_duration: Option<Duration>,
    update_count: u64,
    next_update: Option<TokioInstant>,
    paused: bool,
}

impl FrameClock {
    /// Default first-update jitter ceiling, in microseconds.
    ///
    /// Clocks created at the same instant are desynchronized by a random
    /// 0–2 ms offset so their updates don't all land together.
    pub const DEFAULT_JITTER_US: u64 = 2_000;

    pub fn new(rate: UpdateRate) -> Self {
        Self::with_jitter(rate, Self::DEFAULT_JITTER_US)
    }

    /// Creates a clock with an explicit first-update jitter ceiling.
    /// Tests pass `0` for deterministic deadlines.
    pub fn with_jitter(rate: UpdateRate, jitter_us: u64) -> Self {
        let rate = rate.validated();
        let update_duration = rate.update_duration();

        let next_update = update_duration.map(|d| {
            let jitter = if jitter_us > 0 {
                Duration::from_micros(rand::rng().random_range(0..jitter_us))
            } else {
                Duration::ZERO
            };
            TokioInstant::now() + d + jitter
        });

        if update_duration.is_none() {
            debug!("frame clock created in externally-driven mode");
        } else {
            debug!(rate_hz = rate.0, "frame clock created");
        }

        Self {
            rate,
            update_duration,
            update_count: 0,
            next_update,
            paused: false,
        }
    }

    /// Waits until the next update is due.
    ///
    /// Externally driven (`rate_hz == 0`) or paused clocks pend forever;
    /// a surrounding `tokio::select!` still serves its other branches.
    pub async fn wait_for_update(&mut self) -> UpdateInfo {
        let (next, dur) = match (self.next_update, self.update_duration) {
            (Some(next), Some(dur)) if !self.paused => (next, dur),
            _ => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        };

        time::sleep_until(next).await;

        let now = TokioInstant::now();
        self.update_count += 1;

        let late_by = now.saturating_duration_since(next);
        let overrun = late_by > dur / 10;
        if overrun {
            warn!(
                update = self.update_count,
                late_ms = late_by.as_secs_f64() * 1000.0,
                "update overrun — skipping ahead"
            );
        }

        // Always schedule from now, not from the missed deadline.
        self.next_update = Some(now + dur);

        trace!(update = self.update_count, overrun, "update fired");

        UpdateInfo {
            update: self.update_count,
            dt: dur,
            overrun,
        }
    }

    /// Pauses the pump. Safe to call repeatedly.
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            debug!(update = self.update_count, "frame clock paused");
        }
    }

    /// Resumes after a pause. The next deadline restarts from now so the
    /// paused span doesn't turn into a burst of updates.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            if let Some(dur) = self.update_duration {
                self.next_update = Some(TokioInstant::now() + dur);
            }
            debug!(update = self.update_count, "frame clock resumed");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether the embedding engine drives updates itself.
    pub fn is_externally_driven(&self) -> bool {
        self.update_duration.is_none()
    }

    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    pub fn rate(&self) -> UpdateRate {
        self.rate
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// A context the queue tasks write into, standing in for the world.
    #[derive(Default)]
    struct Log {
        entries: Vec<&'static str>,
    }

    #[test]
    fn test_updates_in_rounds_up() {
        let rate = UpdateRate(10); // 100 ms per update
        assert_eq!(rate.updates_in(Duration::from_millis(200)), 2);
        assert_eq!(rate.updates_in(Duration::from_millis(201)), 3);
        assert_eq!(rate.updates_in(Duration::from_millis(1)), 1);
    }

    #[test]
    fn test_updates_in_never_returns_zero() {
        assert_eq!(UpdateRate(10).updates_in(Duration::ZERO), 1);
        assert_eq!(UpdateRate(0).updates_in(Duration::from_secs(5)), 1);
    }

    #[test]
    fn test_validated_clamps_excessive_rate() {
        assert_eq!(UpdateRate(9999).validated(), UpdateRate(UpdateRate::MAX_HZ));
        assert_eq!(UpdateRate(60).validated(), UpdateRate(60));
        assert_eq!(UpdateRate(0).validated(), UpdateRate(0));
    }

    #[test]
    fn test_next_update_task_runs_on_first_run_due() {
        let mut q: DeferredQueue<Log> = DeferredQueue::new();
        let mut log = Log::default();
        q.next_update(|l| l.entries.push("ran"));

        assert_eq!(q.run_due(&mut log), 1);
        assert_eq!(log.entries, vec!["ran"]);
        assert!(q.is_empty());
    }

    #[test]
    fn test_scheduled_task_does_not_fire_early() {
        let mut q: DeferredQueue<Log> = DeferredQueue::new();
        let mut log = Log::default();
        q.schedule(3, |l| l.entries.push("late"));

        assert_eq!(q.run_due(&mut log), 0);
        assert_eq!(q.run_due(&mut log), 0);
        assert!(log.entries.is_empty());
        assert_eq!(q.run_due(&mut log), 1);
        assert_eq!(log.entries, vec!["late"]);
    }

    #[test]
    fn test_zero_delay_is_treated_as_next_update() {
        // A task must never run inside the update that scheduled it.
        let mut q: DeferredQueue<Log> = DeferredQueue::new();
        let mut log = Log::default();
        q.schedule(0, |l| l.entries.push("ran"));

        assert_eq!(q.len(), 1);
        assert_eq!(q.run_due(&mut log), 1);
    }

    #[test]
    fn test_due_tasks_run_in_scheduling_order() {
        let mut q: DeferredQueue<Log> = DeferredQueue::new();
        let mut log = Log::default();
        q.next_update(|l| l.entries.push("first"));
        q.next_update(|l| l.entries.push("second"));

        q.run_due(&mut log);
        assert_eq!(log.entries, vec!["first", "second"]);
    }

    #[test]
    fn test_mixed_deadlines_leave_later_tasks_pending() {
        let mut q: DeferredQueue<Log> = DeferredQueue::new();
        let mut log = Log::default();
        q.next_update(|l| l.entries.push("soon"));
        q.schedule(2, |l| l.entries.push("later"));

        assert_eq!(q.run_due(&mut log), 1);
        assert_eq!(q.len(), 1);
        assert_eq!(q.run_due(&mut log), 1);
        assert_eq!(log.entries, vec!["soon", "later"]);
    }
}
