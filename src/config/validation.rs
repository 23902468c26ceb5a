//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses resolvable)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;

use crate::config::schema::{resolve_addr, ServiceConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Checks a configuration, collecting every error found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.storage.dir.as_os_str().is_empty() {
        errors.push(ValidationError::new("storage.dir", "must not be empty"));
    }

    if let Err(e) = resolve_addr(&config.listener.bind_address) {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("invalid address {:?}: {e}", config.listener.bind_address),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if let Some(addr) = &config.observability.metrics_address {
        if let Err(e) = resolve_addr(addr) {
            errors.push(ValidationError::new(
                "observability.metrics_address",
                format!("invalid address {addr:?}: {e}"),
            ));
        }
    }

    if let Some(filter) = &config.observability.log_filter {
        if tracing_subscriber::EnvFilter::try_new(filter).is_err() {
            errors.push(ValidationError::new(
                "observability.log_filter",
                format!("invalid filter {filter:?}"),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
