//! Gate configuration schema.
//!
//! Example:
//! ```toml
//! owner = "0x00000000000000000000000000000000000000a1"
//! capacity = "1000000"
//! open_access = false
//!
//! [[callers]]
//! address = "0x00000000000000000000000000000000000000b2"
//! allowed = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use supplygate_contracts::{
    error::{GateError, GateResult},
    event::GateEvent,
    identity::Address,
    quantity::{self, Quantity},
};
use supplygate_core::policy::AuthorizationPolicy;

/// Initial allow-list entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerEntry {
    pub address: Address,
    #[serde(default = "default_allowed")]
    pub allowed: bool,
}

fn default_allowed() -> bool {
    true
}

/// Settings for a freshly created gate.
///
/// Only read when the store is empty. Once a gate exists its persisted state
/// is authoritative and later edits to this file are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GateConfig {
    pub owner: Address,

    /// Accepts a decimal string or a non-negative integer.
    #[serde(with = "quantity::decimal")]
    pub capacity: Quantity,

    #[serde(default)]
    pub open_access: bool,

    /// Applied as one batch, in declaration order.
    #[serde(default)]
    pub callers: Vec<CallerEntry>,
}

impl GateConfig {
    /// Returns `GateError::ConfigError` if the TOML is malformed or does not
    /// match the schema.
    pub fn from_toml_str(s: &str) -> GateResult<Self> {
        toml::from_str(s).map_err(|e| GateError::ConfigError {
            reason: format!("failed to parse gate TOML: {}", e),
        })
    }

    pub fn from_file(path: &Path) -> GateResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| GateError::ConfigError {
            reason: format!("failed to read gate config '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Dry-run the configured owner and seed against a scratch policy.
    pub fn validate(&self) -> GateResult<()> {
        let mut scratch = AuthorizationPolicy::new(self.owner, self.capacity)?;
        self.seed(&mut scratch)?;
        Ok(())
    }

    /// Apply `open_access` when true, then the `callers` batch when
    /// non-empty. Returns the events in that order.
    pub fn seed(&self, policy: &mut AuthorizationPolicy) -> GateResult<Vec<GateEvent>> {
        let mut events = Vec::new();
        if self.open_access {
            events.extend(policy.set_open_access(true));
        }
        if !self.callers.is_empty() {
            let callers: Vec<Address> = self.callers.iter().map(|c| c.address).collect();
            let statuses: Vec<bool> = self.callers.iter().map(|c| c.allowed).collect();
            events.extend(policy.set_caller_statuses(&callers, &statuses)?);
        }
        Ok(events)
    }
}
