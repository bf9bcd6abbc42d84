//! Session Events
//!
//! Per-session tasks never touch history directly. They report progress as
//! events on a channel, and the owner applies them on its own thread.

use std::time::Duration;

use crate::models::{ExchangeId, Payload, Termination};

/// Final result of one session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutcome {
    /// Classified payload, or `None` to keep the provisional one
    pub payload: Option<Payload>,
    /// Trimmed stderr text, if the command wrote any
    pub stderr: Option<String>,
    /// How the process ended
    pub termination: Termination,
    /// Wall-clock time from launch to finalization
    pub duration: Duration,
}

/// Events emitted by running sessions
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Re-rendered provisional payload after new output arrived
    Output {
        /// Exchange the session updates
        id: ExchangeId,
        /// The whole output so far, interpreted
        payload: Payload,
    },
    /// The session has terminated; emitted exactly once, last
    Finished {
        /// Exchange the session updates
        id: ExchangeId,
        /// Classified result
        outcome: SessionOutcome,
    },
}

impl SessionEvent {
    /// Exchange this event belongs to
    pub fn exchange_id(&self) -> ExchangeId {
        match self {
            SessionEvent::Output { id, .. } | SessionEvent::Finished { id, .. } => *id,
        }
    }

    /// Whether this is the terminal event of its session
    pub fn is_finished(&self) -> bool {
        matches!(self, SessionEvent::Finished { .. })
    }
}
