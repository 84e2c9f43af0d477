//! In-memory implementation of `EventSink`.
//!
//! `InMemoryEventLog` keeps the chain in a `Vec` behind `Arc<Mutex<_>>`.
//! Clones share the same chain, so a caller can hand one clone to the gate
//! and keep another to inspect or export what was published.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tracing::debug;

use supplygate_contracts::{
    error::{GateError, GateResult},
    event::EventRecord,
    identity::GateId,
};
use supplygate_core::traits::EventSink;

use crate::{
    chain::{hash_event, verify_chain},
    event::{AuditEvent, AuditLog},
};

pub(crate) struct LogState {
    /// Bound by the first published batch; later batches must match.
    pub(crate) gate_id: Option<GateId>,
    pub(crate) events: Vec<AuditEvent>,
    pub(crate) last_hash: String,
}

/// Append-only, hash-chained event log for a single gate.
#[derive(Clone)]
pub struct InMemoryEventLog {
    pub(crate) state: Arc<Mutex<LogState>>,
}

impl InMemoryEventLog {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(LogState {
                gate_id: None,
                events: Vec::new(),
                last_hash: AuditEvent::GENESIS_HASH.to_string(),
            })),
        }
    }

    /// Number of entries appended so far. Zero if the lock is poisoned; use
    /// `export_log` when that case must surface as an error.
    pub fn len(&self) -> usize {
        self.lock().map(|s| s.events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Export every entry appended so far.
    pub fn export_log(&self) -> GateResult<AuditLog> {
        let state = self.lock()?;
        Ok(AuditLog {
            gate_id: state.gate_id,
            events: state.events.clone(),
            exported_at: Utc::now(),
            terminal_hash: state
                .events
                .last()
                .map(|e| e.this_hash.clone())
                .unwrap_or_default(),
        })
    }

    /// Recompute the whole chain. False if anything was altered or the lock
    /// is poisoned.
    pub fn verify_integrity(&self) -> bool {
        self.lock().map(|s| verify_chain(&s.events)).unwrap_or(false)
    }

    fn lock(&self) -> GateResult<MutexGuard<'_, LogState>> {
        self.state.lock().map_err(|e| GateError::EventPublishFailed {
            reason: format!("event log lock poisoned: {}", e),
        })
    }
}

impl Default for InMemoryEventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for InMemoryEventLog {
    /// Append the batch atomically: either every record is chained or none.
    fn publish(&self, records: &[EventRecord]) -> GateResult<()> {
        let mut state = self.lock()?;

        let Some(expected) = state.gate_id.or_else(|| records.first().map(|r| r.gate_id)) else {
            return Ok(());
        };
        if let Some(stray) = records.iter().find(|r| r.gate_id != expected) {
            return Err(GateError::EventPublishFailed {
                reason: format!(
                    "event log belongs to gate {}, got record from gate {}",
                    expected, stray.gate_id
                ),
            });
        }

        let mut prev_hash = state.last_hash.clone();
        let mut sequence = state.events.len() as u64;
        let mut appended = Vec::with_capacity(records.len());

        for record in records {
            let this_hash = hash_event(&record.gate_id, sequence, record, &prev_hash)?;
            appended.push(AuditEvent {
                sequence,
                gate_id: record.gate_id,
                record: record.clone(),
                prev_hash,
                this_hash: this_hash.clone(),
            });
            prev_hash = this_hash;
            sequence += 1;
        }

        state.gate_id = Some(expected);
        state.events.extend(appended);
        state.last_hash = prev_hash;

        debug!(
            batch = records.len(),
            total = state.events.len(),
            terminal_hash = %state.last_hash,
            "events appended"
        );

        Ok(())
    }
}
