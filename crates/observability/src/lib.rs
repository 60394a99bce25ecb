//! Logging for processes that embed the stockflow allocator.
//!
//! Call [`init`] once at startup, before building a repository with
//! `stockflow_infra::RepositoryConfig`, so connection and schema messages are
//! captured.

/// Tracing configuration (filters, layers).
pub mod tracing;

pub use self::tracing::DEFAULT_FILTER;

/// Initialize process-wide tracing with the stockflow default filter.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    self::tracing::init();
}
