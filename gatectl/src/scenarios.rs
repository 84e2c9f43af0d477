//! Built-in walkthrough of the gate's behavior.
//!
//! Each scenario builds an in-memory gate, drives it through a small supply
//! pipeline, and prints what happened next to what was expected. The pipeline
//! stands in for the token contract: it asks the gate first and only changes
//! supply when the gate says yes.

use supplygate_audit::InMemoryEventLog;
use supplygate_contracts::{
    error::{GateError, GateResult},
    identity::Address,
    quantity::Quantity,
    request::{CallContext, IssuanceRequest},
};
use supplygate_core::{traits::IssuanceHook, CallerAuthorizationGate};
use supplygate_store::MemoryStore;

/// Minimal issuance pipeline: consults the hook, then adjusts supply.
pub struct SupplyPipeline<'a> {
    hook: &'a dyn IssuanceHook,
    outstanding: Quantity,
}

impl<'a> SupplyPipeline<'a> {
    pub fn new(hook: &'a dyn IssuanceHook, outstanding: Quantity) -> Self {
        Self { hook, outstanding }
    }

    pub fn outstanding(&self) -> Quantity {
        self.outstanding
    }

    pub fn issue(&mut self, context: CallContext, quantity: Quantity) -> GateResult<()> {
        self.hook.pre_issue(&IssuanceRequest {
            outstanding: self.outstanding,
            quantity,
            context,
        })?;
        // pre_issue already proved this sum fits under the cap.
        self.outstanding = self.outstanding + quantity;
        Ok(())
    }

    pub fn redeem(&mut self, context: CallContext, quantity: Quantity) -> GateResult<()> {
        self.hook.pre_redeem(&context)?;
        self.outstanding = self.outstanding.saturating_sub(quantity);
        Ok(())
    }
}

/// What a step is expected to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Allowed,
    CapacityExceeded,
    CallerNotPermitted,
}

fn outcome(result: &GateResult<()>) -> Option<Expect> {
    match result {
        Ok(()) => Some(Expect::Allowed),
        Err(GateError::CapacityExceeded { .. }) => Some(Expect::CapacityExceeded),
        Err(GateError::CallerNotPermitted { .. }) => Some(Expect::CallerNotPermitted),
        Err(_) => None,
    }
}

/// Print one step. Returns 1 on mismatch, 0 otherwise.
fn report(label: &str, result: GateResult<()>, expected: Expect) -> usize {
    let actual = outcome(&result);
    let shown = match &result {
        Ok(()) => "allowed".to_string(),
        Err(e) => e.to_string(),
    };
    if actual == Some(expected) {
        println!("  {:<44} {}", label, shown);
        0
    } else {
        println!("  {:<44} {}  [MISMATCH: expected {:?}]", label, shown, expected);
        1
    }
}

fn owner() -> Address {
    Address::from_low_u64(0xa1)
}

fn new_gate(capacity: u64) -> GateResult<(CallerAuthorizationGate, InMemoryEventLog)> {
    let log = InMemoryEventLog::new();
    let gate = CallerAuthorizationGate::new(
        owner(),
        Quantity::from(capacity),
        Box::new(MemoryStore::new()),
        Box::new(log.clone()),
    )?;
    Ok((gate, log))
}

/// Run every scenario. Returns the number of mismatched steps.
pub fn run_all() -> GateResult<usize> {
    let mut mismatches = 0;
    mismatches += capacity_boundary()?;
    mismatches += allow_list()?;
    mismatches += open_access()?;
    Ok(mismatches)
}

/// Capacity 1000, 900 outstanding.
fn capacity_boundary() -> GateResult<usize> {
    println!("=== Scenario 1: Capacity boundary ===");
    let (gate, _log) = new_gate(1_000)?;
    let relayed = CallContext::relayed(Address::from_low_u64(0xc1));
    let direct = CallContext::direct(Address::from_low_u64(0xc1));
    let mut mismatches = 0;

    let mut pipeline = SupplyPipeline::new(&gate, Quantity::from(900u64));
    mismatches += report(
        "issue 150, direct caller",
        pipeline.issue(direct, Quantity::from(150u64)),
        Expect::CapacityExceeded,
    );
    mismatches += report(
        "issue 150, relayed unlisted caller",
        pipeline.issue(relayed, Quantity::from(150u64)),
        Expect::CapacityExceeded,
    );
    mismatches += report(
        "issue 100, relayed unlisted caller",
        pipeline.issue(relayed, Quantity::from(100u64)),
        Expect::CallerNotPermitted,
    );
    mismatches += report(
        "issue 100, direct caller (lands on cap)",
        pipeline.issue(direct, Quantity::from(100u64)),
        Expect::Allowed,
    );
    println!("  outstanding after scenario: {}", pipeline.outstanding());
    println!();
    Ok(mismatches)
}

/// Owner lists A as allowed and B as not allowed.
fn allow_list() -> GateResult<usize> {
    println!("=== Scenario 2: Allow-list ===");
    let (gate, log) = new_gate(1_000)?;
    let a = Address::from_low_u64(0xaa);
    let b = Address::from_low_u64(0xbb);
    gate.set_caller_statuses(&owner(), &[a, b], &[true, false])?;

    let mut mismatches = 0;
    let mut pipeline = SupplyPipeline::new(&gate, Quantity::from(500u64));
    mismatches += report(
        "redeem, A relayed",
        pipeline.redeem(CallContext::relayed(a), Quantity::from(10u64)),
        Expect::Allowed,
    );
    mismatches += report(
        "redeem, B relayed",
        pipeline.redeem(CallContext::relayed(b), Quantity::from(10u64)),
        Expect::CallerNotPermitted,
    );
    mismatches += report(
        "redeem, B direct",
        pipeline.redeem(CallContext::direct(b), Quantity::from(10u64)),
        Expect::Allowed,
    );
    mismatches += report(
        "redeem, unknown address direct",
        pipeline.redeem(
            CallContext::direct(Address::from_low_u64(0xdd)),
            Quantity::from(10u64),
        ),
        Expect::Allowed,
    );
    println!(
        "  event chain: {} entries, {}",
        log.len(),
        if log.verify_integrity() { "VERIFIED" } else { "FAILED" }
    );
    println!();
    Ok(mismatches)
}

/// Owner turns on open access; a relayed stranger can then issue and redeem.
fn open_access() -> GateResult<usize> {
    println!("=== Scenario 3: Open access ===");
    let (gate, _log) = new_gate(1_000)?;
    let stranger = CallContext::relayed(Address::from_low_u64(0xee));

    let mut mismatches = 0;
    let mut pipeline = SupplyPipeline::new(&gate, Quantity::zero());
    mismatches += report(
        "issue 10, relayed stranger, closed",
        pipeline.issue(stranger, Quantity::from(10u64)),
        Expect::CallerNotPermitted,
    );

    gate.set_open_access(&owner(), true)?;
    mismatches += report(
        "issue 10, relayed stranger, open",
        pipeline.issue(stranger, Quantity::from(10u64)),
        Expect::Allowed,
    );
    mismatches += report(
        "redeem 5, relayed stranger, open",
        pipeline.redeem(stranger, Quantity::from(5u64)),
        Expect::Allowed,
    );
    mismatches += report(
        "issue 2000, relayed stranger, open",
        pipeline.issue(stranger, Quantity::from(2_000u64)),
        Expect::CapacityExceeded,
    );
    println!("  outstanding after scenario: {}", pipeline.outstanding());
    println!();
    Ok(mismatches)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
