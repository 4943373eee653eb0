//! Custom event types for TUI application.

use crossterm::event::KeyEvent;

use crate::bridge::{RenderedOutcome, RunStatus};
use crate::error::{BridgeError, LoadError};

/// Events that can occur in the TUI application
#[derive(Debug)]
pub enum TuiEvent {
    /// User keyboard input
    Key(KeyEvent),
    /// Background engine load finished
    EngineLoaded(Result<(), LoadError>),
    /// Status indicator change reported by the bridge
    Status(RunStatus),
    /// One run request completed
    RunFinished(Result<RenderedOutcome, BridgeError>),
    /// Request to quit the application
    Quit,
}
