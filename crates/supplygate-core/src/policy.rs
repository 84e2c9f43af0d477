//! The authorization policy: supply cap plus caller permissions.
//!
//! `AuthorizationPolicy` is plain data with pure decision methods. It knows
//! nothing about locking, storage, or event delivery; `CallerAuthorizationGate`
//! adds those. Admin methods here assume the owner check already passed and
//! return the events the change produces.
//!
//! Caller-permission rule: a call is permitted when open access is on, OR the
//! call is direct, OR the caller is on the allow-list.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use supplygate_contracts::{
    error::{GateError, GateResult},
    event::GateEvent,
    identity::{Address, GateId},
    quantity::{self, Quantity},
    request::{CallContext, IssuanceRequest},
};

/// The gate's persistent state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationPolicy {
    owner: Address,
    #[serde(with = "quantity::decimal")]
    capacity: Quantity,
    open_access: bool,
    /// Addresses whose status is `true`. Absence means `false`.
    allowed_callers: BTreeSet<Address>,
}

impl AuthorizationPolicy {
    /// Create a policy with an empty allow-list and open access off.
    ///
    /// Returns `GateError::InvalidOwner` for the zero address.
    pub fn new(owner: Address, capacity: Quantity) -> GateResult<Self> {
        if owner.is_zero() {
            return Err(GateError::InvalidOwner);
        }
        Ok(Self {
            owner,
            capacity,
            open_access: false,
            allowed_callers: BTreeSet::new(),
        })
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn capacity(&self) -> Quantity {
        self.capacity
    }

    pub fn open_access(&self) -> bool {
        self.open_access
    }

    /// Allow-list status of `caller`. Ignores open access and direct calls.
    pub fn is_caller_allowed(&self, caller: &Address) -> bool {
        self.allowed_callers.contains(caller)
    }

    pub fn allowed_callers(&self) -> impl Iterator<Item = &Address> {
        self.allowed_callers.iter()
    }

    // ── Guarded checks ───────────────────────────────────────────────────────

    pub fn is_permitted(&self, context: &CallContext) -> bool {
        self.open_access || context.direct || self.is_caller_allowed(&context.caller)
    }

    /// Capacity first, then caller permission.
    ///
    /// The cap is inclusive: `outstanding + quantity == capacity` passes.
    pub fn check_issuance(&self, request: &IssuanceRequest) -> GateResult<()> {
        let requested_total = request
            .outstanding
            .checked_add(request.quantity)
            .ok_or(GateError::ArithmeticOverflow)?;

        if requested_total > self.capacity {
            return Err(GateError::CapacityExceeded {
                requested_total,
                capacity: self.capacity,
            });
        }

        self.check_redemption(&request.context)
    }

    /// Redemption only shrinks supply, so only the caller is checked.
    pub fn check_redemption(&self, context: &CallContext) -> GateResult<()> {
        if self.is_permitted(context) {
            Ok(())
        } else {
            Err(GateError::CallerNotPermitted {
                caller: context.caller,
            })
        }
    }

    // ── Admin ────────────────────────────────────────────────────────────────

    pub fn ensure_owner(&self, actor: &Address) -> GateResult<()> {
        if *actor == self.owner {
            Ok(())
        } else {
            Err(GateError::Unauthorized { actor: *actor })
        }
    }

    /// No lower bound: a cap below current supply freezes further issuance.
    pub fn set_capacity(&mut self, capacity: Quantity) -> Vec<GateEvent> {
        self.capacity = capacity;
        vec![GateEvent::CapacityChanged { capacity }]
    }

    /// Apply `(callers[i], statuses[i])` in order.
    ///
    /// Validation runs before anything is written, so a rejected batch leaves
    /// the allow-list untouched. Checks run in this order: length mismatch,
    /// empty input, duplicate caller.
    pub fn set_caller_statuses(
        &mut self,
        callers: &[Address],
        statuses: &[bool],
    ) -> GateResult<Vec<GateEvent>> {
        if callers.len() != statuses.len() {
            return Err(GateError::LengthMismatch {
                callers: callers.len(),
                statuses: statuses.len(),
            });
        }
        if callers.is_empty() {
            return Err(GateError::EmptyInput);
        }
        if let Some(caller) = first_duplicate(callers) {
            return Err(GateError::DuplicateCaller { caller });
        }

        let mut events = Vec::with_capacity(callers.len());
        for (caller, &allowed) in callers.iter().zip(statuses) {
            if allowed {
                self.allowed_callers.insert(*caller);
            } else {
                self.allowed_callers.remove(caller);
            }
            events.push(GateEvent::CallerStatusChanged {
                caller: *caller,
                allowed,
            });
        }
        Ok(events)
    }

    /// Always emits, even when `enabled` matches the current value.
    pub fn set_open_access(&mut self, enabled: bool) -> Vec<GateEvent> {
        self.open_access = enabled;
        vec![GateEvent::OpenAccessChanged { enabled }]
    }

    pub fn transfer_ownership(&mut self, new_owner: Address) -> GateResult<Vec<GateEvent>> {
        if new_owner.is_zero() {
            return Err(GateError::InvalidOwner);
        }
        let previous_owner = std::mem::replace(&mut self.owner, new_owner);
        Ok(vec![GateEvent::OwnershipTransferred {
            previous_owner: Some(previous_owner),
            new_owner,
        }])
    }
}

/// Pairwise scan. Batches are small, so O(n²) is fine.
fn first_duplicate(callers: &[Address]) -> Option<Address> {
    for (i, a) in callers.iter().enumerate() {
        if callers[i + 1..].contains(a) {
            return Some(*a);
        }
    }
    None
}

/// The durable unit a `PolicyStore` reads and writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicySnapshot {
    pub gate_id: GateId,
    pub policy: AuthorizationPolicy,
    pub saved_at: DateTime<Utc>,
}

impl PolicySnapshot {
    pub fn now(gate_id: GateId, policy: AuthorizationPolicy) -> Self {
        Self {
            gate_id,
            policy,
            saved_at: Utc::now(),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use supplygate_contracts::{
        error::GateError,
        event::GateEvent,
        identity::Address,
        quantity::Quantity,
        request::{CallContext, IssuanceRequest},
    };

    use super::AuthorizationPolicy;

    fn owner() -> Address {
        Address::from_low_u64(0x0a)
    }

    fn addr(n: u64) -> Address {
        Address::from_low_u64(0x100 + n)
    }

    fn q(n: u64) -> Quantity {
        Quantity::from(n)
    }

    fn policy(capacity: u64) -> AuthorizationPolicy {
        AuthorizationPolicy::new(owner(), q(capacity)).unwrap()
    }

    fn issue(outstanding: u64, quantity: u64, context: CallContext) -> IssuanceRequest {
        IssuanceRequest {
            outstanding: q(outstanding),
            quantity: q(quantity),
            context,
        }
    }

    // ── Construction ─────────────────────────────────────────────────────────

    #[test]
    fn zero_owner_is_rejected() {
        let result = AuthorizationPolicy::new(Address::ZERO, q(1));
        assert!(matches!(result, Err(GateError::InvalidOwner)));
    }

    #[test]
    fn new_policy_starts_closed() {
        let p = policy(1_000);
        assert_eq!(p.owner(), owner());
        assert_eq!(p.capacity(), q(1_000));
        assert!(!p.open_access());
        assert_eq!(p.allowed_callers().count(), 0);
    }

    // ── Capacity ─────────────────────────────────────────────────────────────

    #[test]
    fn issuance_within_capacity_passes() {
        let p = policy(1_000);
        for (outstanding, quantity) in [(0, 0), (0, 1), (500, 499), (999, 1)] {
            p.check_issuance(&issue(outstanding, quantity, CallContext::direct(addr(1))))
                .unwrap();
        }
    }

    #[test]
    fn issuance_at_exact_capacity_passes() {
        let p = policy(1_000);
        p.check_issuance(&issue(900, 100, CallContext::direct(addr(1))))
            .unwrap();
    }

    #[test]
    fn issuance_over_capacity_fails_regardless_of_caller() {
        let mut p = policy(1_000);
        p.set_open_access(true);
        p.set_caller_statuses(&[addr(1)], &[true]).unwrap();

        for context in [
            CallContext::direct(addr(1)),
            CallContext::relayed(addr(1)),
            CallContext::relayed(addr(2)),
        ] {
            match p.check_issuance(&issue(900, 150, context)) {
                Err(GateError::CapacityExceeded {
                    requested_total,
                    capacity,
                }) => {
                    assert_eq!(requested_total, q(1_050));
                    assert_eq!(capacity, q(1_000));
                }
                other => panic!("expected CapacityExceeded, got {:?}", other),
            }
        }
    }

    #[test]
    fn capacity_is_checked_before_caller() {
        let p = policy(1_000);
        let result = p.check_issuance(&issue(900, 150, CallContext::relayed(addr(5))));
        assert!(matches!(result, Err(GateError::CapacityExceeded { .. })));
    }

    #[test]
    fn within_capacity_relayed_unlisted_caller_is_rejected() {
        let p = policy(1_000);
        match p.check_issuance(&issue(900, 100, CallContext::relayed(addr(5)))) {
            Err(GateError::CallerNotPermitted { caller }) => assert_eq!(caller, addr(5)),
            other => panic!("expected CallerNotPermitted, got {:?}", other),
        }
    }

    #[test]
    fn overflowing_sum_is_an_arithmetic_error() {
        let p = AuthorizationPolicy::new(owner(), Quantity::max_value()).unwrap();
        let request = IssuanceRequest {
            outstanding: Quantity::max_value(),
            quantity: q(1),
            context: CallContext::direct(addr(1)),
        };
        assert!(matches!(
            p.check_issuance(&request),
            Err(GateError::ArithmeticOverflow)
        ));
    }

    #[test]
    fn capacity_below_outstanding_freezes_issuance() {
        let mut p = policy(1_000);
        p.set_capacity(q(100));

        let result = p.check_issuance(&issue(500, 0, CallContext::direct(addr(1))));
        assert!(matches!(result, Err(GateError::CapacityExceeded { .. })));

        // Redemption is unaffected by the cap.
        p.check_redemption(&CallContext::direct(addr(1))).unwrap();
    }

    // ── Caller permission ────────────────────────────────────────────────────

    #[test]
    fn direct_caller_always_passes() {
        let mut p = policy(1_000);
        p.set_caller_statuses(&[addr(1)], &[false]).unwrap();

        for open in [false, true] {
            p.set_open_access(open);
            p.check_redemption(&CallContext::direct(addr(1))).unwrap();
            p.check_redemption(&CallContext::direct(addr(99))).unwrap();
        }
    }

    #[test]
    fn allow_list_governs_relayed_callers() {
        let a = addr(1);
        let b = addr(2);
        let mut p = policy(1_000);
        p.set_caller_statuses(&[a, b], &[true, false]).unwrap();

        p.check_redemption(&CallContext::relayed(a)).unwrap();
        assert!(matches!(
            p.check_redemption(&CallContext::relayed(b)),
            Err(GateError::CallerNotPermitted { .. })
        ));
        p.check_redemption(&CallContext::direct(b)).unwrap();
        p.check_redemption(&CallContext::direct(addr(42))).unwrap();
    }

    #[test]
    fn open_access_admits_relayed_unlisted_callers() {
        let stranger = addr(77);
        let mut p = policy(1_000);
        p.set_open_access(true);

        p.check_issuance(&issue(10, 20, CallContext::relayed(stranger)))
            .unwrap();
        p.check_redemption(&CallContext::relayed(stranger)).unwrap();

        p.set_open_access(false);
        assert!(p.check_redemption(&CallContext::relayed(stranger)).is_err());
    }

    // ── Batch allow-list updates ─────────────────────────────────────────────

    #[test]
    fn batch_update_emits_one_event_per_pair_in_order() {
        let mut p = policy(1_000);
        let events = p
            .set_caller_statuses(&[addr(3), addr(1), addr(2)], &[true, false, true])
            .unwrap();

        assert_eq!(
            events,
            vec![
                GateEvent::CallerStatusChanged { caller: addr(3), allowed: true },
                GateEvent::CallerStatusChanged { caller: addr(1), allowed: false },
                GateEvent::CallerStatusChanged { caller: addr(2), allowed: true },
            ]
        );
        assert!(p.is_caller_allowed(&addr(3)));
        assert!(!p.is_caller_allowed(&addr(1)));
        assert!(p.is_caller_allowed(&addr(2)));
    }

    #[test]
    fn length_mismatch_leaves_list_unchanged() {
        let mut p = policy(1_000);
        p.set_caller_statuses(&[addr(1)], &[true]).unwrap();
        let before = p.clone();

        match p.set_caller_statuses(&[addr(1), addr(2)], &[false]) {
            Err(GateError::LengthMismatch { callers, statuses }) => {
                assert_eq!((callers, statuses), (2, 1));
            }
            other => panic!("expected LengthMismatch, got {:?}", other),
        }
        assert_eq!(p, before);
    }

    #[test]
    fn empty_batch_is_rejected() {
        let mut p = policy(1_000);
        assert!(matches!(
            p.set_caller_statuses(&[], &[]),
            Err(GateError::EmptyInput)
        ));
    }

    #[test]
    fn duplicate_caller_leaves_list_unchanged() {
        let mut p = policy(1_000);
        let before = p.clone();

        match p.set_caller_statuses(&[addr(1), addr(2), addr(1)], &[true, true, false]) {
            Err(GateError::DuplicateCaller { caller }) => assert_eq!(caller, addr(1)),
            other => panic!("expected DuplicateCaller, got {:?}", other),
        }
        assert_eq!(p, before);
    }

    #[test]
    fn length_mismatch_reported_before_duplicates() {
        let mut p = policy(1_000);
        let result = p.set_caller_statuses(&[addr(1), addr(1)], &[true]);
        assert!(matches!(result, Err(GateError::LengthMismatch { .. })));
    }

    #[test]
    fn repeated_status_writes_are_idempotent() {
        let mut p = policy(1_000);
        p.set_caller_statuses(&[addr(1)], &[true]).unwrap();
        p.set_caller_statuses(&[addr(1)], &[true]).unwrap();
        assert_eq!(p.allowed_callers().count(), 1);

        p.set_caller_statuses(&[addr(1)], &[false]).unwrap();
        p.set_caller_statuses(&[addr(1)], &[false]).unwrap();
        assert_eq!(p.allowed_callers().count(), 0);
    }

    // ── Open access and ownership ────────────────────────────────────────────

    #[test]
    fn open_access_emits_even_when_unchanged() {
        let mut p = policy(1_000);
        assert_eq!(
            p.set_open_access(false),
            vec![GateEvent::OpenAccessChanged { enabled: false }]
        );
    }

    #[test]
    fn ensure_owner_rejects_others() {
        let p = policy(1_000);
        p.ensure_owner(&owner()).unwrap();
        match p.ensure_owner(&addr(1)) {
            Err(GateError::Unauthorized { actor }) => assert_eq!(actor, addr(1)),
            other => panic!("expected Unauthorized, got {:?}", other),
        }
    }

    #[test]
    fn ownership_transfer_is_immediate() {
        let mut p = policy(1_000);
        let events = p.transfer_ownership(addr(9)).unwrap();

        assert_eq!(p.owner(), addr(9));
        assert!(p.ensure_owner(&owner()).is_err());
        assert_eq!(
            events,
            vec![GateEvent::OwnershipTransferred {
                previous_owner: Some(owner()),
                new_owner: addr(9),
            }]
        );
    }

    #[test]
    fn ownership_transfer_to_zero_is_rejected() {
        let mut p = policy(1_000);
        assert!(matches!(
            p.transfer_ownership(Address::ZERO),
            Err(GateError::InvalidOwner)
        ));
        assert_eq!(p.owner(), owner());
    }

    #[test]
    fn policy_state_survives_json() {
        let mut p = policy(1_000);
        p.set_open_access(true);
        p.set_caller_statuses(&[addr(1), addr(2)], &[true, true]).unwrap();

        let json = serde_json::to_string(&p).unwrap();
        let back: AuthorizationPolicy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
