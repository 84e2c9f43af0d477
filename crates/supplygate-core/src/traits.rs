//! Trait seams around the gate.
//!
//! - `IssuanceHook` — what the issuance pipeline calls before changing supply
//! - `EventSink`    — where committed admin changes are announced
//! - `PolicyStore`  — where the policy is persisted between restarts
//!
//! `CallerAuthorizationGate` implements the first and owns one of each of the
//! other two.

use supplygate_contracts::{
    error::GateResult,
    event::EventRecord,
    request::{CallContext, IssuanceRequest},
};

use crate::policy::PolicySnapshot;

/// The callback surface the issuance pipeline invokes immediately before it
/// mutates total supply.
///
/// Any `Err` means the pipeline must abort the enclosing mint or redeem and
/// apply no supply change.
pub trait IssuanceHook: Send + Sync {
    /// Check a pending issuance against the supply cap and the caller policy.
    fn pre_issue(&self, request: &IssuanceRequest) -> GateResult<()>;

    /// Check a pending redemption against the caller policy.
    fn pre_redeem(&self, context: &CallContext) -> GateResult<()>;
}

/// Receives the events produced by each committed admin operation.
///
/// One call per mutation. The batch is ordered as the events were produced;
/// a batch update of N callers arrives as N records in input order.
pub trait EventSink: Send + Sync {
    /// Accept a batch of records.
    ///
    /// Returning `Err` aborts the mutation: the gate restores the previous
    /// snapshot and surfaces the error to the caller.
    fn publish(&self, records: &[EventRecord]) -> GateResult<()>;
}

/// Durable storage for the gate's policy.
///
/// Implementations must be read-after-write consistent: a `load()` following
/// a successful `save()` returns what was saved.
pub trait PolicyStore: Send + Sync {
    /// Return the last saved snapshot, or `None` if nothing was ever saved.
    fn load(&self) -> GateResult<Option<PolicySnapshot>>;

    /// Replace the stored snapshot.
    fn save(&self, snapshot: &PolicySnapshot) -> GateResult<()>;

    /// Drop the stored snapshot so the next `load()` returns `None`.
    ///
    /// Only used to undo the first save of a gate whose creation failed.
    fn clear(&self) -> GateResult<()>;
}
