//! # supplygate-contracts
//!
//! Shared types, events, and errors for the supplygate issuance gate.
//!
//! Every crate in the workspace imports from here. No policy logic lives in
//! this crate, only data definitions, parsing, and the error taxonomy.

pub mod error;
pub mod event;
pub mod identity;
pub mod quantity;
pub mod request;
