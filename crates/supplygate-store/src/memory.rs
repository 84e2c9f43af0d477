//! `PolicyStore` kept in process memory.

use std::sync::{Arc, Mutex};

use supplygate_contracts::error::{GateError, GateResult};
use supplygate_core::{policy::PolicySnapshot, traits::PolicyStore};

/// Holds the latest snapshot. Clones share it.
#[derive(Clone, Default)]
pub struct MemoryStore {
    latest: Arc<Mutex<Option<PolicySnapshot>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PolicyStore for MemoryStore {
    fn load(&self) -> GateResult<Option<PolicySnapshot>> {
        let latest = self.latest.lock().map_err(|e| GateError::StorageFailed {
            reason: format!("memory store lock poisoned: {}", e),
        })?;
        Ok(latest.clone())
    }

    fn save(&self, snapshot: &PolicySnapshot) -> GateResult<()> {
        let mut latest = self.latest.lock().map_err(|e| GateError::StorageFailed {
            reason: format!("memory store lock poisoned: {}", e),
        })?;
        *latest = Some(snapshot.clone());
        Ok(())
    }

    fn clear(&self) -> GateResult<()> {
        let mut latest = self.latest.lock().map_err(|e| GateError::StorageFailed {
            reason: format!("memory store lock poisoned: {}", e),
        })?;
        *latest = None;
        Ok(())
    }
}
