//! # supplygate-store
//!
//! `PolicyStore` implementations:
//!
//! - [`MemoryStore`] for tests and embedded use
//! - [`FileStore`] for a gate whose state must survive restarts

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// ── Tests ─────────────────────────────────────────────────────────────────────
