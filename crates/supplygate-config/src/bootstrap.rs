//! Create-or-restore a gate from configuration.
//!
//! 1. If the store already holds a snapshot, restore it and ignore the config.
//! 2. Otherwise create a gate with the configured owner and capacity, with
//!    open access and the `callers` batch applied to its policy before the
//!    first save.
//!
//! The seed runs the same policy operations as the admin calls, so it is
//! validated the same way and emits the same events. Those events follow the
//! construction event in one batch. Any failure leaves the store empty.

use tracing::info;

use supplygate_contracts::error::GateResult;
use supplygate_core::{
    traits::{EventSink, PolicyStore},
    CallerAuthorizationGate,
};

use crate::config::GateConfig;

pub fn open_gate(
    config: &GateConfig,
    store: Box<dyn PolicyStore>,
    sink: Box<dyn EventSink>,
) -> GateResult<CallerAuthorizationGate> {
    if store.load()?.is_some() {
        let gate = CallerAuthorizationGate::restore(store, sink)?;
        info!(
            gate_id = %gate.gate_id(),
            "existing gate state found; configuration not applied"
        );
        return Ok(gate);
    }

    let gate = CallerAuthorizationGate::new_seeded(
        config.owner,
        config.capacity,
        store,
        sink,
        |policy| config.seed(policy),
    )?;

    info!(
        gate_id = %gate.gate_id(),
        seeded_callers = config.callers.len(),
        open_access = config.open_access,
        "gate created from configuration"
    );
    Ok(gate)
}
