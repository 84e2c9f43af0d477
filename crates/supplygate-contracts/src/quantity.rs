//! Supply quantities.
//!
//! Quantities are unsigned 256-bit integers. On the wire (JSON state files,
//! TOML config) they are decimal strings; deserialization also accepts plain
//! non-negative integers so small configs can write `capacity = 1000`.

use std::fmt;

use serde::{de, Deserializer, Serializer};

use crate::error::{GateError, GateResult};

/// An unsigned 256-bit share quantity.
pub type Quantity = primitive_types::U256;

/// Parse a decimal string into a `Quantity`.
pub fn parse_quantity(s: &str) -> GateResult<Quantity> {
    Quantity::from_dec_str(s.trim()).map_err(|e| GateError::ConfigError {
        reason: format!("invalid quantity '{}': {:?}", s, e),
    })
}

/// `#[serde(with = "quantity::decimal")]` adapter.
pub mod decimal {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Quantity, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Quantity, D::Error> {
        deserializer.deserialize_any(QuantityVisitor)
    }

    struct QuantityVisitor;

    impl<'de> de::Visitor<'de> for QuantityVisitor {
        type Value = Quantity;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a decimal string or a non-negative integer")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Quantity, E> {
            parse_quantity(v).map_err(E::custom)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Quantity, E> {
            Ok(Quantity::from(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Quantity, E> {
            u64::try_from(v)
                .map(Quantity::from)
                .map_err(|_| E::custom(format!("quantity must not be negative, got {}", v)))
        }
    }
}
