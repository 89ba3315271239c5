//! Integration tests for the fixed-timestep frame clock.
//!
//! Uses `tokio::time::pause()` (via `start_paused`) so `sleep_until`
//! resolves deterministically without real waiting.

use std::time::Duration;

use reclaim_tick::{DeferredQueue, FrameClock, UpdateRate};

fn clock_10hz() -> FrameClock {
    FrameClock::with_jitter(UpdateRate(10), 0)
}

// =========================================================================
// Creation and accessors
// =========================================================================

#[test]
fn test_clock_initial_state() {
    let c = clock_10hz();
    assert_eq!(c.update_count(), 0);
    assert_eq!(c.rate(), UpdateRate(10));
    assert!(!c.is_externally_driven());
    assert!(!c.is_paused());
}

#[test]
fn test_clock_externally_driven_mode() {
    let c = FrameClock::with_jitter(UpdateRate(0), 0);
    assert!(c.is_externally_driven());
}

#[test]
fn test_clock_clamps_excessive_rate() {
    let c = FrameClock::with_jitter(UpdateRate(100_000), 0);
    assert_eq!(c.rate(), UpdateRate(UpdateRate::MAX_HZ));
}

// =========================================================================
// Update firing
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_wait_for_update_fires_and_increments() {
    let mut c = clock_10hz();

    let info = c.wait_for_update().await;
    assert_eq!(info.update, 1);
    assert_eq!(info.dt, Duration::from_millis(100));
    assert!(!info.overrun);
    assert_eq!(c.update_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_updates_increment_monotonically() {
    let mut c = clock_10hz();

    for expected in 1..=5 {
        let info = c.wait_for_update().await;
        assert_eq!(info.update, expected);
    }
    assert_eq!(c.update_count(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_paused_clock_does_not_fire() {
    let mut c = clock_10hz();
    c.pause();
    assert!(c.is_paused());

    let fired = tokio::time::timeout(
        Duration::from_secs(5),
        c.wait_for_update(),
    )
    .await;
    assert!(fired.is_err(), "paused clock must pend forever");
}

#[tokio::test(start_paused = true)]
async fn test_resume_restarts_from_now() {
    let mut c = clock_10hz();
    c.pause();
    tokio::time::advance(Duration::from_secs(60)).await;
    c.resume();

    // One update after resuming, not a burst covering the paused minute.
    let info = c.wait_for_update().await;
    assert_eq!(info.update, 1);
    assert!(!info.overrun);
}

#[tokio::test(start_paused = true)]
async fn test_externally_driven_clock_pends_forever() {
    let mut c = FrameClock::with_jitter(UpdateRate(0), 0);

    let fired = tokio::time::timeout(
        Duration::from_secs(5),
        c.wait_for_update(),
    )
    .await;
    assert!(fired.is_err());
}

// =========================================================================
// Clock + queue: the intended pairing
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_clock_drives_deferred_queue() {
    let mut c = clock_10hz();
    let mut q: DeferredQueue<Vec<u64>> = DeferredQueue::new();
    let mut fired: Vec<u64> = Vec::new();

    // A 200 ms delay at 10 Hz is two updates.
    let delay = UpdateRate(10).updates_in(Duration::from_millis(200));
    assert_eq!(delay, 2);
    q.schedule(delay, |log| log.push(99));

    let info = c.wait_for_update().await;
    q.run_due(&mut fired);
    assert!(fired.is_empty(), "must not fire after {} update(s)", info.update);

    c.wait_for_update().await;
    q.run_due(&mut fired);
    assert_eq!(fired, vec![99]);
}
