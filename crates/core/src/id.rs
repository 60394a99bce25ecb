//! Strongly-typed identifiers used across the domain.
//!
//! Batches, orders, and products are all keyed by plain strings in the
//! outside world. Wrapping them keeps a SKU from being passed where a batch
//! reference is expected.

use serde::{Deserialize, Serialize};

/// Identifier of a batch or an order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reference(String);

/// Stock-keeping unit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sku(String);

macro_rules! impl_string_newtype {
    ($t:ty) => {
        impl $t {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $t {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $t {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

impl_string_newtype!(Reference);
impl_string_newtype!(Sku);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_the_raw_string() {
        assert_eq!(Reference::new("batch-001").to_string(), "batch-001");
        assert_eq!(Sku::from("RETRO-CLOCK").to_string(), "RETRO-CLOCK");
    }

    #[test]
    fn serializes_transparently() {
        let json = serde_json::to_string(&Sku::new("ELEGANT-LAMP")).unwrap();
        assert_eq!(json, "\"ELEGANT-LAMP\"");

        let back: Reference = serde_json::from_str("\"order-123\"").unwrap();
        assert_eq!(back, Reference::new("order-123"));
    }
}
