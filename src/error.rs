//! Typed errors for the places where callers have to branch on the kind.
//!
//! Everything else in the crate is either an `anyhow::Error` with context or
//! is folded into an absent/empty result and logged.

use thiserror::Error;

/// Failure reported by a platform window backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnumerationError {
    #[error("permission denied while enumerating windows: {0}")]
    PermissionDenied(String),

    #[error("window enumeration is not available: {0}")]
    Unsupported(String),

    #[error("window enumeration failed: {0}")]
    Failed(String),
}

/// Conditions that stop the watcher and need a message for the user.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error(
        "not allowed to enumerate windows ({0}). \
         Run this program from an elevated (administrator) terminal."
    )]
    PermissionDenied(String),

    #[error("the music player is not running. Start it first, then run this program again.")]
    PlayerNotRunning,
}

/// A transport-level failure. These are the only failures that are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("server answered with HTTP {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Request(String),
}
