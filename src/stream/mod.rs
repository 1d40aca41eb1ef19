// Competition stream: transport, lifecycle and the sequential apply loop

mod controller;
mod http;
mod sse;
mod transport;

pub use controller::{Frame, StreamController};
pub use http::HttpTransport;
pub use sse::{decode_events, SseDecoder};
pub use transport::{EventStream, Transport};

use serde::Serialize;
use std::fmt;


/// Lifecycle of one competition run.
///
/// `Stopped` and `Errored` are passed through on the way back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunState {
    Idle,
    Connecting,
    Streaming,
    Stopped,
    Errored,
}

impl RunState {
    /// True while a connection is being opened or consumed
    pub fn is_active(&self) -> bool {
        matches!(self, RunState::Connecting | RunState::Streaming)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RunState::Idle => "idle",
            RunState::Connecting => "connecting",
            RunState::Streaming => "streaming",
            RunState::Stopped => "stopped",
            RunState::Errored => "errored",
        };
        f.write_str(label)
    }
}

/// How the last run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RunOutcome {
    Stopped,
    Errored { reason: String },
}

/// Enabled state of the start and stop controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ControlSurface {
    pub start_enabled: bool,
    pub stop_enabled: bool,
}

impl ControlSurface {
    pub fn idle() -> Self {
        Self {
            start_enabled: true,
            stop_enabled: false,
        }
    }

    pub fn running() -> Self {
        Self {
            start_enabled: false,
            stop_enabled: true,
        }
    }
}

impl Default for ControlSurface {
    fn default() -> Self {
        Self::idle()
    }
}

/// Operator input accepted by the controller loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Start,
    Stop,
    /// Leave the loop; an open connection is dropped without a stop request
    Shutdown,
}
