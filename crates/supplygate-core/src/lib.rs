//! # supplygate-core
//!
//! The caller-authorization gate consulted before shares are issued or
//! redeemed.
//!
//! This crate provides:
//! - `AuthorizationPolicy`, the pure capacity and caller-permission logic
//! - The three seam traits (`IssuanceHook`, `EventSink`, `PolicyStore`)
//! - `CallerAuthorizationGate`, which serializes every check and mutation
//!   through one lock, persists each change, and publishes its events
//!
//! ## Usage
//!
//! ```rust,ignore
//! use supplygate_core::{CallerAuthorizationGate, traits::IssuanceHook};
//!
//! let gate = CallerAuthorizationGate::new(owner, capacity, Box::new(store), Box::new(log))?;
//! gate.pre_issue(&request)?;
//! ```

pub mod gate;
pub mod policy;
pub mod traits;

pub use gate::CallerAuthorizationGate;
pub use policy::{AuthorizationPolicy, PolicySnapshot};
