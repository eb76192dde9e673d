// Application state module
// Lifecycle of a display session

use log::debug;
use thiserror::Error;

/// Where a display session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing acquired yet
    Uninitialized,
    /// Connected to the compositor
    Connected,
    /// Window mapped, event loop active
    Running,
    /// All resources released
    Closed,
}

impl SessionState {
    /// The state that follows this one, if any
    pub fn next(self) -> Option<SessionState> {
        match self {
            SessionState::Uninitialized => Some(SessionState::Connected),
            SessionState::Connected => Some(SessionState::Running),
            SessionState::Running => Some(SessionState::Closed),
            SessionState::Closed => None,
        }
    }

    /// Move to `to`, which must be the next state
    pub fn advance(&mut self, to: SessionState) -> Result<(), InvalidTransition> {
        if self.next() != Some(to) {
            return Err(InvalidTransition { from: *self, to });
        }
        debug!("Session state: {:?} -> {:?}", self, to);
        *self = to;
        Ok(())
    }

    pub fn is_running(self) -> bool {
        self == SessionState::Running
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid session transition {from:?} -> {to:?}")]
pub struct InvalidTransition {
    pub from: SessionState,
    pub to: SessionState,
}
