use crate::models::user::Principal;
use std::sync::RwLock;

/// The process-wide "connected user" slot. At most one principal at a time.
pub struct SessionSlot {
    current: RwLock<Option<Principal>>,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
        }
    }

    /// Snapshot of the connected principal, if any
    pub fn current(&self) -> Option<Principal> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Install `principal`, returning whoever was connected before.
    pub fn replace(&self, principal: Principal) -> Option<Principal> {
        self.current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .replace(principal)
    }

    /// Disconnect, returning the principal that was connected.
    pub fn clear(&self) -> Option<Principal> {
        self.current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }
}

impl Default for SessionSlot {
    fn default() -> Self {
        Self::new()
    }
}
