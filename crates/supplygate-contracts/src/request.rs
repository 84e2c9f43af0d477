//! Per-call inputs supplied by the issuance pipeline.

use serde::{Deserialize, Serialize};

use crate::identity::Address;
use crate::quantity::{self, Quantity};

/// Who is calling, and whether they called directly.
///
/// `direct` is true when the stated caller originated the request with no
/// intermediary relaying it. The gate cannot derive this itself; the hosting
/// environment must supply it on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    pub caller: Address,
    pub direct: bool,
}

impl CallContext {
    pub fn direct(caller: Address) -> Self {
        Self { caller, direct: true }
    }

    pub fn relayed(caller: Address) -> Self {
        Self { caller, direct: false }
    }
}

/// A pre-issue check request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceRequest {
    /// Supply outstanding before this issuance.
    #[serde(with = "quantity::decimal")]
    pub outstanding: Quantity,
    /// Quantity the caller wants to issue.
    #[serde(with = "quantity::decimal")]
    pub quantity: Quantity,
    pub context: CallContext,
}
