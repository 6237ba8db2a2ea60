//! Structured logging configuration.
//!
//! Library code logs through the `log` facade; the subscriber installed here
//! also captures those records, so one filter covers both.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,sqlx=warn";

/// Initialize logging to stderr
///
/// Log levels are configurable via the `RUST_LOG` env var. Standard output
/// stays reserved for command results such as CSV exports.
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::debug!("Structured logging initialized");
}

/// Log the outcome of a storage round trip
///
/// # Arguments
///
/// * `operation` - Command name
/// * `backend` - Store description
/// * `duration_ms` - Duration in milliseconds
pub fn log_store_operation(operation: &str, backend: &str, duration_ms: u64) {
    if duration_ms > 1000 {
        tracing::warn!(
            operation = operation,
            backend = backend,
            duration_ms = duration_ms,
            "Slow storage operation"
        );
    } else {
        tracing::debug!(
            operation = operation,
            backend = backend,
            duration_ms = duration_ms,
            "Storage operation"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }

    #[test]
    fn test_log_store_operation() {
        // Just ensure it doesn't panic without a subscriber
        log_store_operation("bet", "memory", 3);
        log_store_operation("import", "PostgreSQL", 2500);
    }
}
