//! Session error types.

use thiserror::Error;

/// Errors surfaced by the session facade.
///
/// Transient connectivity problems are never surfaced: the state machine
/// recovers from them internally and blocked callers keep waiting. The only
/// way a blocked caller is released without data is an explicit close.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session was closed while a caller was blocked.
    #[error("Session closed")]
    Closed,

    /// A command issued to the transport substrate failed.
    #[error("Transport command failed: {0}")]
    Transport(String),

    /// The session driver task is no longer running.
    #[error("Channel send error: {0}")]
    ChannelSend(String),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
