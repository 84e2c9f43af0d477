//! The caller-authorization gate: a serialized, persisted policy.
//!
//! Every check and every mutation runs under one lock, so a check always sees
//! a consistent policy and admin changes never interleave.
//!
//! Mutation order:
//!
//!   Lock → Owner check → Validate + apply to candidate → Save → Publish → Commit
//!
//! If `save` fails nothing has changed. If `publish` fails the previous
//! snapshot is written back and the in-memory policy is left as it was.
//! Construction follows the same shape, except that a failed publish clears
//! the store instead of writing an older snapshot back.

use std::sync::{Mutex, MutexGuard};

use tracing::{debug, error, info, warn};

use supplygate_contracts::{
    error::{GateError, GateResult},
    event::{EventRecord, GateEvent},
    identity::{Address, GateId},
    quantity::Quantity,
    request::{CallContext, IssuanceRequest},
};

use crate::{
    policy::{AuthorizationPolicy, PolicySnapshot},
    traits::{EventSink, IssuanceHook, PolicyStore},
};

/// The gate handed to the issuance pipeline.
///
/// Construct with `new` for a fresh gate or `restore` to resume from storage.
/// The gate owns its store and sink; nothing else writes to either.
pub struct CallerAuthorizationGate {
    gate_id: GateId,
    policy: Mutex<AuthorizationPolicy>,
    store: Box<dyn PolicyStore>,
    sink: Box<dyn EventSink>,
}

impl CallerAuthorizationGate {
    /// Create a gate owned by `owner` with the given supply cap.
    ///
    /// Persists the initial snapshot and publishes
    /// `OwnershipTransferred { previous_owner: None, .. }`.
    pub fn new(
        owner: Address,
        capacity: Quantity,
        store: Box<dyn PolicyStore>,
        sink: Box<dyn EventSink>,
    ) -> GateResult<Self> {
        Self::new_seeded(owner, capacity, store, sink, |_| Ok(Vec::new()))
    }

    /// Create a gate and apply `seed` to its policy before anything is
    /// persisted.
    ///
    /// The seeded policy is saved once, and the construction event plus the
    /// seed's events go out as a single batch. If `seed` fails nothing is
    /// written. If the publish fails the saved snapshot is cleared again, so
    /// a later `restore` does not pick up a gate that was never announced.
    pub fn new_seeded<F>(
        owner: Address,
        capacity: Quantity,
        store: Box<dyn PolicyStore>,
        sink: Box<dyn EventSink>,
        seed: F,
    ) -> GateResult<Self>
    where
        F: FnOnce(&mut AuthorizationPolicy) -> GateResult<Vec<GateEvent>>,
    {
        let mut policy = AuthorizationPolicy::new(owner, capacity)?;
        let gate_id = GateId::new();

        let mut events = vec![GateEvent::OwnershipTransferred {
            previous_owner: None,
            new_owner: owner,
        }];
        events.extend(seed(&mut policy)?);

        store.save(&PolicySnapshot::now(gate_id, policy.clone()))?;

        let records: Vec<EventRecord> = events
            .into_iter()
            .map(|event| EventRecord::now(gate_id, event))
            .collect();

        if let Err(publish_err) = sink.publish(&records) {
            if let Err(clear_err) = store.clear() {
                error!(
                    gate_id = %gate_id,
                    error = %clear_err,
                    "failed to clear initial snapshot after publish failure"
                );
            }
            warn!(
                gate_id = %gate_id,
                error = %publish_err,
                "event publish failed, gate not created"
            );
            return Err(publish_err);
        }

        info!(
            gate_id = %gate_id,
            owner = %owner,
            capacity = %capacity,
            event_count = records.len(),
            "issuance gate created"
        );

        Ok(Self {
            gate_id,
            policy: Mutex::new(policy),
            store,
            sink,
        })
    }

    /// Resume a gate from its last saved snapshot. Publishes nothing.
    ///
    /// Returns `GateError::ConfigError` if the store is empty and
    /// `GateError::StorageFailed` if the saved owner is the zero address.
    pub fn restore(store: Box<dyn PolicyStore>, sink: Box<dyn EventSink>) -> GateResult<Self> {
        let snapshot = store.load()?.ok_or_else(|| GateError::ConfigError {
            reason: "no saved gate state to restore".to_string(),
        })?;

        if snapshot.policy.owner().is_zero() {
            return Err(GateError::StorageFailed {
                reason: format!(
                    "saved state for gate {} has the zero address as owner",
                    snapshot.gate_id
                ),
            });
        }

        info!(
            gate_id = %snapshot.gate_id,
            owner = %snapshot.policy.owner(),
            saved_at = %snapshot.saved_at,
            "issuance gate restored"
        );

        Ok(Self {
            gate_id: snapshot.gate_id,
            policy: Mutex::new(snapshot.policy),
            store,
            sink,
        })
    }

    pub fn gate_id(&self) -> GateId {
        self.gate_id
    }

    // ── Guarded checks ───────────────────────────────────────────────────────

    /// Pre-issue check. Capacity first, then caller permission.
    pub fn check_issuance(&self, request: &IssuanceRequest) -> GateResult<()> {
        let policy = self.lock()?;

        debug!(
            gate_id = %self.gate_id,
            caller = %request.context.caller,
            direct = request.context.direct,
            outstanding = %request.outstanding,
            quantity = %request.quantity,
            "checking issuance"
        );

        policy.check_issuance(request).inspect_err(|e| {
            warn!(
                gate_id = %self.gate_id,
                caller = %request.context.caller,
                error = %e,
                "issuance rejected"
            );
        })
    }

    /// Pre-redeem check. Caller permission only.
    pub fn check_redemption(&self, context: &CallContext) -> GateResult<()> {
        let policy = self.lock()?;

        debug!(
            gate_id = %self.gate_id,
            caller = %context.caller,
            direct = context.direct,
            "checking redemption"
        );

        policy.check_redemption(context).inspect_err(|e| {
            warn!(
                gate_id = %self.gate_id,
                caller = %context.caller,
                error = %e,
                "redemption rejected"
            );
        })
    }

    // ── Admin ────────────────────────────────────────────────────────────────

    pub fn set_capacity(&self, actor: &Address, capacity: Quantity) -> GateResult<()> {
        self.mutate(actor, "set_capacity", |policy| Ok(policy.set_capacity(capacity)))
    }

    /// Set allow-list status for each `(callers[i], statuses[i])`.
    ///
    /// All-or-nothing: a rejected batch changes nothing and publishes nothing.
    pub fn set_caller_statuses(
        &self,
        actor: &Address,
        callers: &[Address],
        statuses: &[bool],
    ) -> GateResult<()> {
        self.mutate(actor, "set_caller_statuses", |policy| {
            policy.set_caller_statuses(callers, statuses)
        })
    }

    pub fn set_open_access(&self, actor: &Address, enabled: bool) -> GateResult<()> {
        self.mutate(actor, "set_open_access", |policy| {
            Ok(policy.set_open_access(enabled))
        })
    }

    /// Hand the gate to `new_owner`. Takes effect immediately.
    pub fn transfer_ownership(&self, actor: &Address, new_owner: Address) -> GateResult<()> {
        self.mutate(actor, "transfer_ownership", |policy| {
            policy.transfer_ownership(new_owner)
        })
    }

    // ── Views ────────────────────────────────────────────────────────────────

    pub fn owner(&self) -> GateResult<Address> {
        Ok(self.lock()?.owner())
    }

    pub fn capacity(&self) -> GateResult<Quantity> {
        Ok(self.lock()?.capacity())
    }

    pub fn open_access(&self) -> GateResult<bool> {
        Ok(self.lock()?.open_access())
    }

    pub fn is_caller_allowed(&self, caller: &Address) -> GateResult<bool> {
        Ok(self.lock()?.is_caller_allowed(caller))
    }

    pub fn snapshot(&self) -> GateResult<PolicySnapshot> {
        Ok(PolicySnapshot::now(self.gate_id, self.lock()?.clone()))
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn lock(&self) -> GateResult<MutexGuard<'_, AuthorizationPolicy>> {
        self.policy.lock().map_err(|e| GateError::StateUnavailable {
            reason: format!("gate state lock poisoned: {}", e),
        })
    }

    fn mutate<F>(&self, actor: &Address, operation: &'static str, apply: F) -> GateResult<()>
    where
        F: FnOnce(&mut AuthorizationPolicy) -> GateResult<Vec<GateEvent>>,
    {
        let mut policy = self.lock()?;

        if let Err(e) = policy.ensure_owner(actor) {
            warn!(
                gate_id = %self.gate_id,
                actor = %actor,
                operation,
                "admin operation rejected: not the owner"
            );
            return Err(e);
        }

        let mut candidate = policy.clone();
        let events = apply(&mut candidate).inspect_err(|e| {
            warn!(
                gate_id = %self.gate_id,
                operation,
                error = %e,
                "admin operation rejected"
            );
        })?;

        self.store
            .save(&PolicySnapshot::now(self.gate_id, candidate.clone()))?;

        let records: Vec<EventRecord> = events
            .into_iter()
            .map(|event| EventRecord::now(self.gate_id, event))
            .collect();

        if let Err(publish_err) = self.sink.publish(&records) {
            // Put the store back in step with the in-memory policy.
            if let Err(rollback_err) = self
                .store
                .save(&PolicySnapshot::now(self.gate_id, policy.clone()))
            {
                error!(
                    gate_id = %self.gate_id,
                    operation,
                    error = %rollback_err,
                    "failed to restore previous snapshot after publish failure"
                );
            }
            warn!(
                gate_id = %self.gate_id,
                operation,
                error = %publish_err,
                "event publish failed, mutation rolled back"
            );
            return Err(publish_err);
        }

        *policy = candidate;

        info!(
            gate_id = %self.gate_id,
            actor = %actor,
            operation,
            event_count = records.len(),
            "admin operation committed"
        );

        Ok(())
    }
}

impl IssuanceHook for CallerAuthorizationGate {
    fn pre_issue(&self, request: &IssuanceRequest) -> GateResult<()> {
        self.check_issuance(request)
    }

    fn pre_redeem(&self, context: &CallContext) -> GateResult<()> {
        self.check_redemption(context)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
