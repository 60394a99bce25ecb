//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset: allocation decisions and repository
/// wiring at `info`, sqlx statement logging kept to warnings.
pub const DEFAULT_FILTER: &str =
    "info,stockflow_allocation=info,stockflow_infra=info,sqlx=warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize tracing/logging for the process.
///
/// JSON lines with timestamps and targets. Set e.g.
/// `RUST_LOG=stockflow_allocation=debug` to log every chosen batch, or
/// `RUST_LOG=stockflow_infra=debug` to see repository spans.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }

    #[test]
    fn init_is_idempotent() {
        init();
        init();
        ::tracing::info!(target: "stockflow_infra", "still logging after repeated init");
    }
}
