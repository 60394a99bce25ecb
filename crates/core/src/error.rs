//! Domain error model.

use thiserror::Error;

use crate::id::Sku;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Only deterministic business outcomes live here. Storage failures and missing
/// records belong to the repository layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// No candidate batch could satisfy an order line for this SKU.
    #[error("out of stock for sku {0}")]
    OutOfStock(Sku),
}

impl DomainError {
    pub fn out_of_stock(sku: Sku) -> Self {
        Self::OutOfStock(sku)
    }

    /// The SKU the failed request was for.
    pub fn sku(&self) -> &Sku {
        match self {
            DomainError::OutOfStock(sku) => sku,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_stock_message_names_the_sku() {
        let err = DomainError::out_of_stock(Sku::new("SMALL-FORK"));
        assert_eq!(err.to_string(), "out of stock for sku SMALL-FORK");
        assert_eq!(err.sku().as_str(), "SMALL-FORK");
    }
}
