//! Error types for the session layer.

use reclaim_world::PlayerId;

/// Errors that can occur while opening a session.
///
/// Both are recoverable: the caller logs and moves on, leaving the player
/// without a session. Stale-handle situations are deliberately *not*
/// errors — closing an untracked entity is a silent no-op, because
/// concurrent destruction through disconnects and kill events is routine.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The player left the world between the request and the spawn.
    #[error("player {0} is not in the world")]
    PlayerOffline(PlayerId),

    /// The engine refused to spawn the recycler entity.
    #[error("world refused to spawn a recycler for {0}")]
    SpawnFailed(PlayerId),
}
