//! Command dispatch
//!
//! Executes recognized commands against the device authorities and reports
//! one outcome per command. Failures are reported, never retried; the user
//! resolves missing elevation out-of-band and speaks again.

use crate::command::CommandKind;
use crate::lock::{DeviceLockAuthority, LockError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome reported to the host for one dispatched command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchOutcome {
    pub success: bool,
    pub message: String,
}

impl DispatchOutcome {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Routes recognized commands to the owning authority
pub struct CommandDispatcher {
    lock: Arc<dyn DeviceLockAuthority>,
}

impl CommandDispatcher {
    pub fn new(lock: Arc<dyn DeviceLockAuthority>) -> Self {
        Self { lock }
    }

    /// Execute one recognized command
    pub fn dispatch(&self, command: &CommandKind) -> DispatchOutcome {
        info!(command = command.name(), "dispatching command");

        match command {
            CommandKind::Lock => match self.lock.lock_now() {
                Ok(()) => DispatchOutcome::ok("Phone locked successfully"),
                Err(LockError::NotElevated) => {
                    warn!("lock command without device admin");
                    DispatchOutcome::failed(
                        "Device admin not enabled. Please enable it in Permissions.",
                    )
                }
                Err(e) => DispatchOutcome::failed(e.to_string()),
            },
            CommandKind::Call { target } => {
                DispatchOutcome::failed(format!("Call feature coming soon. Target: {target}"))
            }
            CommandKind::Message { target } => DispatchOutcome::failed(format!(
                "Message feature coming soon. Target: {}",
                target.as_deref().unwrap_or("unknown")
            )),
            CommandKind::Open { target } => {
                DispatchOutcome::failed(format!("Open app feature coming soon. Target: {target}"))
            }
        }
    }
}
