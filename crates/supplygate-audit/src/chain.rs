//! Hash-chain primitives.
//!
//! Hash input layout (bytes, in order):
//!   1. gate_id as its hyphenated UUID string
//!   2. sequence as 8-byte little-endian
//!   3. prev_hash as UTF-8 (64 ASCII hex chars)
//!   4. compact JSON of the event record

use sha2::{Digest, Sha256};

use supplygate_contracts::{
    error::{GateError, GateResult},
    event::EventRecord,
    identity::GateId,
};

use crate::event::AuditEvent;

/// SHA-256 over one chain entry. Returns lowercase hex.
pub fn hash_event(
    gate_id: &GateId,
    sequence: u64,
    record: &EventRecord,
    prev_hash: &str,
) -> GateResult<String> {
    let record_json = serde_json::to_vec(record).map_err(|e| GateError::EventPublishFailed {
        reason: format!("event record not serializable: {}", e),
    })?;

    let mut hasher = Sha256::new();
    hasher.update(gate_id.to_string().as_bytes());
    hasher.update(sequence.to_le_bytes());
    hasher.update(prev_hash.as_bytes());
    hasher.update(&record_json);

    Ok(hex::encode(hasher.finalize()))
}

/// Check linkage and hash correctness of every entry.
///
/// Entry 0 must link to `AuditEvent::GENESIS_HASH` and sequences must run
/// 0, 1, 2, … without gaps. An empty chain is valid.
pub fn verify_chain(events: &[AuditEvent]) -> bool {
    let mut expected_prev = AuditEvent::GENESIS_HASH.to_string();

    for (position, event) in events.iter().enumerate() {
        if event.sequence != position as u64 || event.prev_hash != expected_prev {
            return false;
        }

        match hash_event(&event.gate_id, event.sequence, &event.record, &event.prev_hash) {
            Ok(recomputed) if recomputed == event.this_hash => {}
            _ => return false,
        }

        expected_prev = event.this_hash.clone();
    }

    true
}
