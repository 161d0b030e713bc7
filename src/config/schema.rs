//! Configuration schema definitions.
//!
//! This module defines the configuration structure for a rollups
//! application. All types derive Serde traits for deserialization from
//! config files, and every section has defaults so an empty file is valid.

use serde::{Deserialize, Serialize};

/// Environment variable consulted when `server.url` is left empty.
pub const SERVER_URL_ENV: &str = "ROLLUP_HTTP_SERVER_URL";

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RollupsConfig {
    /// Rollup node connection.
    pub server: ServerConfig,

    /// Retry policy for node calls.
    pub retries: RetryConfig,

    /// Well-known contract addresses of the deployment.
    pub network: NetworkAddresses,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Rollup node connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the node's HTTP API. Empty means read `ROLLUP_HTTP_SERVER_URL`.
    pub url: String,

    /// Timeout for output calls in seconds. `finish` long-polls and is never timed out.
    pub output_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            output_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    /// The configured URL, falling back to the environment.
    pub fn resolve_url(&self) -> Option<String> {
        if !self.url.is_empty() {
            return Some(self.url.clone());
        }
        std::env::var(SERVER_URL_ENV).ok().filter(|url| !url.is_empty())
    }
}

/// Retry configuration for transport calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per call, including the first one.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 100,
            max_delay_ms: 5000,
        }
    }
}

/// Deployment addresses of the rollups framework contracts.
///
/// Empty entries are treated as not deployed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkAddresses {
    pub ether_portal: String,
    pub erc20_portal: String,
    pub erc721_portal: String,
    pub erc1155_single_portal: String,
    pub erc1155_batch_portal: String,
    pub dapp_address_relay: String,
}

impl NetworkAddresses {
    /// Named, non-empty entries.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("ether_portal", self.ether_portal.as_str()),
            ("erc20_portal", self.erc20_portal.as_str()),
            ("erc721_portal", self.erc721_portal.as_str()),
            ("erc1155_single_portal", self.erc1155_single_portal.as_str()),
            ("erc1155_batch_portal", self.erc1155_batch_portal.as_str()),
            ("dapp_address_relay", self.dapp_address_relay.as_str()),
        ]
        .into_iter()
        .filter(|(_, address)| !address.is_empty())
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
