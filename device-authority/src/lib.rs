//! Device Authority - permission and device-lock collaborators
//!
//! This crate models the platform services the voice assistant depends on:
//! - Capability grants (microphone, telephony, messaging, contacts)
//! - Device-admin gated immediate lock
//! - Dispatch of recognized voice commands to those authorities

pub mod capability;
pub mod command;
pub mod dispatcher;
pub mod lock;

pub use capability::{
    Capability, GrantTable, PermissionAuthority, PermissionError, PermissionState,
};
pub use command::CommandKind;
pub use dispatcher::{CommandDispatcher, DispatchOutcome};
pub use lock::{DeviceLockAuthority, LockError, SoftLock};

/// Current version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
