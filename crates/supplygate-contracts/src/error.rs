//! Error taxonomy for the issuance gate.
//!
//! Every gate operation returns `GateResult<T>`. All variants are terminal:
//! the invoking collaborator must abort the enclosing mint or redeem, and no
//! admin operation is ever partially applied.

use thiserror::Error;

use crate::identity::Address;
use crate::quantity::Quantity;

#[derive(Debug, Error)]
pub enum GateError {
    /// Issuing would push outstanding supply past the configured cap.
    #[error("supply cap exceeded: requested total {requested_total} is above capacity {capacity}")]
    CapacityExceeded {
        requested_total: Quantity,
        capacity: Quantity,
    },

    /// A relayed caller is not on the allow-list and open access is off.
    #[error("address {caller} not permitted to call")]
    CallerNotPermitted { caller: Address },

    /// `callers` and `statuses` have different lengths.
    #[error("array length mismatch: {callers} callers, {statuses} statuses")]
    LengthMismatch { callers: usize, statuses: usize },

    #[error("array length must be > 0")]
    EmptyInput,

    #[error("cannot duplicate callers: {caller} appears more than once")]
    DuplicateCaller { caller: Address },

    /// An admin operation was invoked by someone other than the owner.
    #[error("caller {actor} is not the owner")]
    Unauthorized { actor: Address },

    #[error("new owner is the zero address")]
    InvalidOwner,

    /// `outstanding + quantity` does not fit in 256 bits.
    #[error("arithmetic overflow computing outstanding + quantity")]
    ArithmeticOverflow,

    /// The policy store could not load or persist a snapshot.
    #[error("storage failed: {reason}")]
    StorageFailed { reason: String },

    /// The event sink rejected a batch. The mutation is rolled back.
    #[error("event publish failed: {reason}")]
    EventPublishFailed { reason: String },

    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// The gate's state lock was poisoned by a panicking thread.
    #[error("gate state unavailable: {reason}")]
    StateUnavailable { reason: String },
}

pub type GateResult<T> = Result<T, GateError>;
