//! Recognized voice-command classes
//!
//! The vocabulary of device actions a detected utterance can map to. Only
//! `Lock` is executable today; the others carry their parsed target so the
//! host can report what was understood.

use serde::{Deserialize, Serialize};

/// Recognized command classes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CommandKind {
    /// Lock the device immediately
    Lock,

    /// Place a call to the parsed target
    Call { target: String },

    /// Send a message to the parsed target, when one could be extracted
    Message { target: Option<String> },

    /// Open the named application
    Open { target: String },
}

impl CommandKind {
    /// Wire name of the command class
    pub fn name(&self) -> &'static str {
        match self {
            CommandKind::Lock => "lock",
            CommandKind::Call { .. } => "call",
            CommandKind::Message { .. } => "message",
            CommandKind::Open { .. } => "open",
        }
    }
}
