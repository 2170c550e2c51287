//! Capability classes and the permission-grant authority

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use tracing::info;

/// Permission errors
#[derive(Error, Debug)]
pub enum PermissionError {
    #[error("Unknown capability: {0}")]
    UnknownCapability(String),

    #[error("Invalid policy format: {0}")]
    InvalidFormat(String),
}

/// Capability classes the assistant can be granted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Record audio for speech recognition
    Microphone,
    /// Place calls and read phone state
    Telephony,
    /// Send and read messages
    Messaging,
    /// Read and write contacts
    Contacts,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::Microphone,
        Capability::Telephony,
        Capability::Messaging,
        Capability::Contacts,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Microphone => "microphone",
            Capability::Telephony => "telephony",
            Capability::Messaging => "messaging",
            Capability::Contacts => "contacts",
        }
    }

    /// Parse a capability name, accepting the platform aliases
    /// ("phone", "sms") alongside the canonical names.
    pub fn parse(name: &str) -> Result<Self, PermissionError> {
        match name.trim().to_lowercase().as_str() {
            "microphone" => Ok(Capability::Microphone),
            "telephony" | "phone" => Ok(Capability::Telephony),
            "messaging" | "sms" => Ok(Capability::Messaging),
            "contacts" => Ok(Capability::Contacts),
            other => Err(PermissionError::UnknownCapability(other.to_string())),
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grant state for a capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    Granted,
    Denied,
}

impl PermissionState {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionState::Granted)
    }
}

/// Grants and denies capability classes
#[async_trait]
pub trait PermissionAuthority: Send + Sync {
    /// Ask the user (or policy) for the capability
    async fn request(&self, capability: Capability) -> PermissionState;

    /// Current grant state without prompting
    fn check(&self, capability: Capability) -> PermissionState;
}

/// In-memory grant table
///
/// Policy-file-backed stand-in for the platform permission service.
/// Unknown capabilities are denied until granted.
pub struct GrantTable {
    grants: RwLock<HashMap<Capability, PermissionState>>,
    /// Grant any capability the first time it is requested
    grant_on_request: bool,
}

impl GrantTable {
    /// Empty table; every request is denied
    pub fn new() -> Self {
        Self {
            grants: RwLock::new(HashMap::new()),
            grant_on_request: false,
        }
    }

    /// Table that grants any capability on request
    pub fn permissive() -> Self {
        Self {
            grants: RwLock::new(HashMap::new()),
            grant_on_request: true,
        }
    }

    pub fn grant(&self, capability: Capability) {
        self.grants.write().insert(capability, PermissionState::Granted);
    }

    pub fn deny(&self, capability: Capability) {
        self.grants.write().insert(capability, PermissionState::Denied);
    }

    /// Load a policy from its JSON form
    pub fn from_json(json: &str) -> Result<Self, PermissionError> {
        let grants: HashMap<Capability, PermissionState> =
            serde_json::from_str(json).map_err(|e| PermissionError::InvalidFormat(e.to_string()))?;
        Ok(Self {
            grants: RwLock::new(grants),
            grant_on_request: false,
        })
    }

    /// Export the policy as JSON
    pub fn to_json(&self) -> Result<String, PermissionError> {
        let grants = self.grants.read();
        serde_json::to_string_pretty(&*grants)
            .map_err(|e| PermissionError::InvalidFormat(e.to_string()))
    }

    /// Load a policy from its YAML form
    pub fn from_yaml(yaml: &str) -> Result<Self, PermissionError> {
        let grants: HashMap<Capability, PermissionState> =
            serde_yaml::from_str(yaml).map_err(|e| PermissionError::InvalidFormat(e.to_string()))?;
        Ok(Self {
            grants: RwLock::new(grants),
            grant_on_request: false,
        })
    }

    /// Export the policy as YAML
    pub fn to_yaml(&self) -> Result<String, PermissionError> {
        let grants = self.grants.read();
        serde_yaml::to_string(&*grants).map_err(|e| PermissionError::InvalidFormat(e.to_string()))
    }
}

impl Default for GrantTable {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PermissionAuthority for GrantTable {
    async fn request(&self, capability: Capability) -> PermissionState {
        if self.grant_on_request {
            info!(%capability, "granting on request");
            self.grant(capability);
        }
        self.check(capability)
    }

    fn check(&self, capability: Capability) -> PermissionState {
        self.grants
            .read()
            .get(&capability)
            .copied()
            .unwrap_or(PermissionState::Denied)
    }
}
