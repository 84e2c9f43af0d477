//! Notifications emitted by admin operations.
//!
//! Events travel on a side channel (`EventSink` in supplygate-core), separate
//! from operation results. Each committed mutation publishes its events as one
//! ordered batch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{Address, GateId};
use crate::quantity::{self, Quantity};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GateEvent {
    CapacityChanged {
        #[serde(with = "quantity::decimal")]
        capacity: Quantity,
    },

    /// One per `(caller, status)` pair in a batch update, in input order.
    CallerStatusChanged { caller: Address, allowed: bool },

    /// Emitted on every call, even when the flag did not change.
    OpenAccessChanged { enabled: bool },

    /// `previous_owner` is `None` only for the construction event.
    OwnershipTransferred {
        previous_owner: Option<Address>,
        new_owner: Address,
    },
}

/// A `GateEvent` stamped with its origin and time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub gate_id: GateId,
    pub event: GateEvent,
    pub timestamp: DateTime<Utc>,
}

impl EventRecord {
    pub fn now(gate_id: GateId, event: GateEvent) -> Self {
        Self {
            gate_id,
            event,
            timestamp: Utc::now(),
        }
    }
}
