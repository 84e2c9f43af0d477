//! Chain entry and exported log types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use supplygate_contracts::{event::EventRecord, identity::GateId};

/// One published `EventRecord`, linked to its predecessor by hash.
///
/// Changing any field, including inside `record`, invalidates `this_hash`
/// and every later `prev_hash`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Position in the chain, starting at 0.
    pub sequence: u64,
    pub gate_id: GateId,
    pub record: EventRecord,
    /// `this_hash` of the previous entry, or `GENESIS_HASH` for entry 0.
    pub prev_hash: String,
    pub this_hash: String,
}

impl AuditEvent {
    /// `prev_hash` of the first entry in every chain: 64 hex zeros.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";
}

/// A point-in-time export of a gate's event chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    /// `None` until the first batch arrives.
    pub gate_id: Option<GateId>,
    pub events: Vec<AuditEvent>,
    pub exported_at: DateTime<Utc>,
    /// `this_hash` of the last entry; empty when the log is empty.
    pub terminal_hash: String,
}
