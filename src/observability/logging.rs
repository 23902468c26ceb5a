//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Pick the filter from the environment, the config, or the verbose flag
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` always wins; otherwise quiet unless verbose

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Filter used when verbose output is requested.
pub const VERBOSE_FILTER: &str = "vcsstore=debug,tower_http=debug";

/// Filter used otherwise.
pub const QUIET_FILTER: &str = "error";

/// Returns the filter directives to use when `RUST_LOG` is unset.
pub fn default_filter(config: &ObservabilityConfig) -> String {
    match &config.log_filter {
        Some(filter) => filter.clone(),
        None if config.verbose => VERBOSE_FILTER.to_string(),
        None => QUIET_FILTER.to_string(),
    }
}

/// Installs the global subscriber. Later calls are no-ops.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(config)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
