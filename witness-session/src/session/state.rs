//! Session state machine states.

use std::fmt;

/// State of the local session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No discovery, no advertising, no connection.
    #[default]
    Idle,
    /// Advertising the local identity and discovering remote identities
    /// concurrently; no established connection yet.
    Searching,
    /// Exactly one established connection; advertising and discovery are
    /// stopped.
    Connected,
}

impl SessionState {
    /// Check if a connection is established.
    pub fn is_connected(&self) -> bool {
        matches!(self, SessionState::Connected)
    }

    /// Check if the session is looking for a peer.
    pub fn is_searching(&self) -> bool {
        matches!(self, SessionState::Searching)
    }

    /// Check if the session is inactive.
    pub fn is_idle(&self) -> bool {
        matches!(self, SessionState::Idle)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Searching => write!(f, "searching"),
            SessionState::Connected => write!(f, "connected"),
        }
    }
}
