//! Allocation domain module.
//!
//! This crate contains the business rules for assigning order lines to stock
//! batches, implemented purely as deterministic domain logic (no IO, no
//! storage).

pub mod batch;
pub mod order_line;
pub mod service;

pub use batch::Batch;
pub use order_line::OrderLine;
pub use service::allocate;
