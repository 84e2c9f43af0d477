//! # supplygate-audit
//!
//! Append-only, SHA-256 hash-chained record of every event a gate publishes.
//!
//! Each `EventRecord` handed to `InMemoryEventLog::publish` becomes an
//! `AuditEvent` linked to its predecessor by hash. Altering any stored entry
//! breaks the chain, which `verify_chain` detects.
//!
//! ```rust,ignore
//! let log = InMemoryEventLog::new();
//! let gate = CallerAuthorizationGate::new(owner, cap, Box::new(store), Box::new(log.clone()))?;
//! gate.set_open_access(&owner, true)?;
//! assert!(log.verify_integrity());
//! ```

pub mod chain;
pub mod event;
pub mod memory;

pub use chain::{hash_event, verify_chain};
pub use event::{AuditEvent, AuditLog};
pub use memory::InMemoryEventLog;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use supplygate_contracts::{
        error::GateError,
        event::{EventRecord, GateEvent},
        identity::{Address, GateId},
        quantity::Quantity,
    };
    use supplygate_core::traits::EventSink;

    use super::{AuditEvent, InMemoryEventLog};

    fn capacity_record(gate_id: GateId, capacity: u64) -> EventRecord {
        EventRecord::now(
            gate_id,
            GateEvent::CapacityChanged {
                capacity: Quantity::from(capacity),
            },
        )
    }

    fn status_record(gate_id: GateId, n: u64, allowed: bool) -> EventRecord {
        EventRecord::now(
            gate_id,
            GateEvent::CallerStatusChanged {
                caller: Address::from_low_u64(n),
                allowed,
            },
        )
    }

    /// Three batches of mixed size chain correctly.
    #[test]
    fn test_chain_integrity_across_batches() {
        let gate = GateId::new();
        let log = InMemoryEventLog::new();
        log.publish(&[capacity_record(gate, 10)]).unwrap();
        log.publish(&[status_record(gate, 1, true), status_record(gate, 2, false)])
            .unwrap();
        log.publish(&[capacity_record(gate, 20)]).unwrap();

        assert_eq!(log.len(), 4);
        assert!(log.verify_integrity());
    }

    /// Rewriting a stored event's payload breaks verification.
    #[test]
    fn test_tamper_detection() {
        let gate = GateId::new();
        let log = InMemoryEventLog::new();
        log.publish(&[status_record(gate, 1, false), status_record(gate, 2, false)])
            .unwrap();

        {
            let mut state = log.state.lock().unwrap();
            state.events[0].record.event = GateEvent::CallerStatusChanged {
                caller: Address::from_low_u64(1),
                allowed: true,
            };
        }

        assert!(!log.verify_integrity(), "altered entry must be detected");
    }

    /// Dropping an entry from the middle breaks the linkage.
    #[test]
    fn test_removed_entry_detected() {
        let gate = GateId::new();
        let log = InMemoryEventLog::new();
        for n in 0..3 {
            log.publish(&[capacity_record(gate, n)]).unwrap();
        }

        let mut events = log.export_log().unwrap().events;
        events.remove(1);
        assert!(!super::verify_chain(&events));
    }

    #[test]
    fn test_genesis_and_sequence() {
        let gate = GateId::new();
        let log = InMemoryEventLog::new();
        log.publish(&[
            status_record(gate, 1, true),
            status_record(gate, 2, true),
            status_record(gate, 3, true),
        ])
        .unwrap();

        let exported = log.export_log().unwrap();
        assert_eq!(exported.events[0].prev_hash, AuditEvent::GENESIS_HASH);
        for (idx, event) in exported.events.iter().enumerate() {
            assert_eq!(event.sequence, idx as u64);
        }
        assert_eq!(
            exported.terminal_hash,
            exported.events.last().unwrap().this_hash
        );
        assert_eq!(exported.gate_id, Some(gate));
    }

    /// Batch order is preserved in the chain.
    #[test]
    fn test_batch_order_preserved() {
        let gate = GateId::new();
        let log = InMemoryEventLog::new();
        log.publish(&[
            status_record(gate, 9, true),
            status_record(gate, 4, false),
        ])
        .unwrap();

        let events: Vec<GateEvent> = log
            .export_log()
            .unwrap()
            .events
            .into_iter()
            .map(|e| e.record.event)
            .collect();
        assert_eq!(
            events,
            vec![
                GateEvent::CallerStatusChanged { caller: Address::from_low_u64(9), allowed: true },
                GateEvent::CallerStatusChanged { caller: Address::from_low_u64(4), allowed: false },
            ]
        );
    }

    /// A log is bound to the first gate that publishes to it.
    #[test]
    fn test_foreign_gate_rejected() {
        let log = InMemoryEventLog::new();
        log.publish(&[capacity_record(GateId::new(), 1)]).unwrap();

        let result = log.publish(&[capacity_record(GateId::new(), 2)]);
        assert!(matches!(result, Err(GateError::EventPublishFailed { .. })));
        assert_eq!(log.len(), 1, "rejected batch must not be appended");
    }

    #[test]
    fn test_poisoned_log_reports_empty_and_unverified() {
        let log = InMemoryEventLog::new();
        log.publish(&[capacity_record(GateId::new(), 1)]).unwrap();

        let state = std::sync::Arc::clone(&log.state);
        let _ = std::thread::spawn(move || {
            let _guard = state.lock().unwrap();
            panic!("poison the log");
        })
        .join();

        assert_eq!(log.len(), 0);
        assert!(!log.verify_integrity());
        assert!(matches!(
            log.export_log(),
            Err(GateError::EventPublishFailed { .. })
        ));
    }

    #[test]
    fn test_empty_log() {
        let log = InMemoryEventLog::new();
        assert!(log.is_empty());
        assert!(log.verify_integrity());
        assert!(super::verify_chain(&[]));

        let exported = log.export_log().unwrap();
        assert!(exported.gate_id.is_none());
        assert!(exported.terminal_hash.is_empty());
    }
}
