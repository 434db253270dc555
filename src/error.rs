//! Errors surfaced by the spawn/select path.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpawnError {
    /// The activated row does not refer to a catalog entry.
    #[error("entry {0} is not in the catalog")]
    UnknownEntry(usize),

    /// No local character to spawn next to.
    #[error("no local character available, enter a match to spawn items")]
    NoCharacter,

    /// Online spawning is disabled or the session is not in a room.
    #[error("online spawn disabled or not in a room")]
    OnlineDisabled,

    /// The host rejected or failed the spawn.
    #[error("spawn failed for {name}: {reason}")]
    Failed { name: String, reason: String },
}
