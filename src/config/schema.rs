//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::storage::{PathLayout, Storage};

/// Root configuration for vcsstore.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Repository storage settings.
    pub storage: StorageConfig,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Include error details in responses (don't use on public servers).
    pub debug: bool,
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root directory for cloned repositories.
    pub dir: PathBuf,

    /// Layout of repositories under `dir`.
    pub layout: PathLayout,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("/tmp/vcsstore"),
            layout: PathLayout::Flat,
        }
    }
}

impl StorageConfig {
    pub fn storage(&self) -> Storage {
        Storage::new(self.dir.clone(), self.layout)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:9090", or ":9090" for all interfaces).
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: ":9090".to_string(),
        }
    }
}

impl ListenerConfig {
    /// Resolves the bind address to a socket address.
    pub fn socket_addr(&self) -> std::io::Result<SocketAddr> {
        resolve_addr(&self.bind_address)
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log service activity to stderr.
    pub verbose: bool,

    /// Explicit tracing filter; overrides `verbose` when set.
    pub log_filter: Option<String>,

    /// Prometheus metrics endpoint bind address; disabled when unset.
    pub metrics_address: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            verbose: true,
            log_filter: None,
            metrics_address: None,
        }
    }
}

/// Resolves "host:port" or Go-style ":port" addresses.
pub fn resolve_addr(addr: &str) -> std::io::Result<SocketAddr> {
    let addr = if addr.starts_with(':') {
        format!("0.0.0.0{addr}")
    } else {
        addr.to_string()
    };
    addr.to_socket_addrs()?.next().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{addr} resolves to no addresses"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.storage.dir, PathBuf::from("/tmp/vcsstore"));
        assert_eq!(config.storage.layout, PathLayout::Flat);
        assert_eq!(config.listener.bind_address, ":9090");
        assert!(config.observability.verbose);
        assert!(!config.debug);
    }

    #[test]
    fn test_resolve_go_style_address() {
        let addr = resolve_addr(":9090").unwrap();
        assert_eq!(addr, "0.0.0.0:9090".parse().unwrap());
        let addr = resolve_addr("127.0.0.1:0").unwrap();
        assert_eq!(addr.port(), 0);
        assert!(resolve_addr("not an address").is_err());
    }

    #[test]
    fn test_partial_toml() {
        let config: ServiceConfig = toml::from_str(
            r#"
            debug = true

            [storage]
            layout = "hashed"
            "#,
        )
        .unwrap();
        assert!(config.debug);
        assert_eq!(config.storage.layout, PathLayout::Hashed);
        assert_eq!(config.storage.dir, PathBuf::from("/tmp/vcsstore"));
        assert_eq!(config.timeouts.request_secs, 30);
    }
}
