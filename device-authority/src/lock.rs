//! Device-lock authority
//!
//! Immediate-lock capability gated on elevated (device-admin) privilege.
//! Elevation is granted out-of-band through a settings flow; a lock attempt
//! without it fails and is never retried automatically.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use thiserror::Error;
use tracing::{info, warn};

/// Lock errors
#[derive(Error, Debug)]
pub enum LockError {
    #[error("Device admin not enabled")]
    NotElevated,

    #[error("Lock failed: {0}")]
    Failed(String),
}

/// Locks the device on demand
pub trait DeviceLockAuthority: Send + Sync {
    /// Whether device-admin privilege has been granted
    fn is_elevated(&self) -> bool;

    /// Grant device-admin privilege (stands in for the settings flow)
    fn request_elevation(&self);

    /// Lock the device now
    fn lock_now(&self) -> Result<(), LockError>;
}

/// In-process lock stand-in that records lock calls
pub struct SoftLock {
    elevated: AtomicBool,
    lock_count: AtomicU64,
}

impl SoftLock {
    pub fn new(elevated: bool) -> Self {
        Self {
            elevated: AtomicBool::new(elevated),
            lock_count: AtomicU64::new(0),
        }
    }

    /// Number of successful lock calls so far
    pub fn lock_count(&self) -> u64 {
        self.lock_count.load(Ordering::SeqCst)
    }

    pub fn revoke_elevation(&self) {
        self.elevated.store(false, Ordering::SeqCst);
    }
}

impl DeviceLockAuthority for SoftLock {
    fn is_elevated(&self) -> bool {
        self.elevated.load(Ordering::SeqCst)
    }

    fn request_elevation(&self) {
        self.elevated.store(true, Ordering::SeqCst);
        info!("device admin enabled");
    }

    fn lock_now(&self) -> Result<(), LockError> {
        if !self.is_elevated() {
            warn!("lock refused, device admin not enabled");
            return Err(LockError::NotElevated);
        }
        self.lock_count.fetch_add(1, Ordering::SeqCst);
        info!("device locked");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_without_elevation_fails() {
        let lock = SoftLock::new(false);
        assert!(!lock.is_elevated());
        assert!(matches!(lock.lock_now(), Err(LockError::NotElevated)));
        assert_eq!(lock.lock_count(), 0);
    }

    #[test]
    fn test_lock_after_elevation_succeeds() {
        let lock = SoftLock::new(false);
        lock.request_elevation();
        assert!(lock.is_elevated());
        lock.lock_now().unwrap();
        lock.lock_now().unwrap();
        assert_eq!(lock.lock_count(), 2);
    }

    #[test]
    fn test_revoked_elevation_blocks_lock() {
        let lock = SoftLock::new(true);
        lock.lock_now().unwrap();
        lock.revoke_elevation();
        assert!(matches!(lock.lock_now(), Err(LockError::NotElevated)));
        assert_eq!(lock.lock_count(), 1);
    }
}
