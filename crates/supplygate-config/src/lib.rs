//! # supplygate-config
//!
//! TOML configuration for a new gate, and [`open_gate`], which restores an
//! existing gate from its store or creates one from the configuration.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use supplygate_config::{open_gate, GateConfig};
//!
//! let config = GateConfig::from_file(Path::new("gate.toml"))?;
//! let gate = open_gate(&config, Box::new(FileStore::new("gate-state.json")), Box::new(log))?;
//! ```

pub mod bootstrap;
pub mod config;

pub use bootstrap::open_gate;
pub use config::{CallerEntry, GateConfig};

// ── Tests ─────────────────────────────────────────────────────────────────────
