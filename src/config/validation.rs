//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (attempts > 0, delays ordered)
//! - Check that URLs, socket addresses and contract addresses are well formed
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RollupsConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use alloy::primitives::Address;

use crate::config::schema::RollupsConfig;

/// A single failed check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a parsed configuration.
pub fn validate_config(config: &RollupsConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !config.server.url.is_empty() {
        if let Err(e) = url::Url::parse(&config.server.url) {
            errors.push(ValidationError::new("server.url", e.to_string()));
        }
    }

    let retries = &config.retries;
    if retries.max_attempts == 0 {
        errors.push(ValidationError::new("retries.max_attempts", "must be at least 1"));
    }
    if retries.base_delay_ms > retries.max_delay_ms {
        errors.push(ValidationError::new(
            "retries.base_delay_ms",
            "must not exceed retries.max_delay_ms",
        ));
    }

    for (name, address) in config.network.entries() {
        if address.len() != 42 || address.parse::<Address>().is_err() {
            errors.push(ValidationError::new(
                format!("network.{}", name),
                format!("'{}' is not a 20-byte hex address", address),
            ));
        }
    }

    let observability = &config.observability;
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&RollupsConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = RollupsConfig::default();
        config.server.url = "not a url".into();
        config.retries.max_attempts = 0;
        config.network.erc20_portal = "0x1234".into();
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "nowhere".into();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "server.url",
                "retries.max_attempts",
                "network.erc20_portal",
                "observability.metrics_address"
            ]
        );
    }
}
