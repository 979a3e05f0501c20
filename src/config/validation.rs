//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts and interval within (0, 1 day], ports non-zero)
//! - Detect ports listed twice
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: PoolmonConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::PoolmonConfig;

/// Upper bound for every timeout and the scan interval.
pub const MAX_DURATION_SECS: u64 = 24 * 60 * 60;

/// A single semantic problem with an otherwise well-formed config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no plain ports configured")]
    NoPorts,

    #[error("port 0 is not a valid {0} port")]
    ZeroPort(&'static str),

    #[error("port {0} is listed more than once")]
    DuplicatePort(u16),

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("{0} of {1}s exceeds the {max}s limit", max = MAX_DURATION_SECS)]
    DurationTooLong(&'static str, u64),

    #[error("unknown log level '{0}'")]
    LogLevel(String),

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),
}

/// Check a config for semantic errors, collecting every problem found.
pub fn validate_config(config: &PoolmonConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.scan.ports.is_empty() {
        errors.push(ValidationError::NoPorts);
    }

    let mut seen = HashSet::new();
    for (kind, ports) in [("plain", &config.scan.ports), ("ssl", &config.scan.ssl_ports)] {
        for &port in ports {
            if port == 0 {
                errors.push(ValidationError::ZeroPort(kind));
            } else if !seen.insert(port) {
                errors.push(ValidationError::DuplicatePort(port));
            }
        }
    }

    let durations = [
        ("scan timeout", config.scan.timeout_secs),
        ("scan interval", config.scan.interval_secs),
        ("director timeout", config.director.timeout_secs),
    ];
    for (name, secs) in durations {
        if secs == 0 {
            errors.push(ValidationError::ZeroDuration(name));
        } else if secs > MAX_DURATION_SECS {
            errors.push(ValidationError::DurationTooLong(name, secs));
        }
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !matches!(level.as_str(), "trace" | "debug" | "info" | "warn" | "error") {
        errors.push(ValidationError::LogLevel(config.observability.log_level.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
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
    fn default_config_is_valid() {
        assert_eq!(validate_config(&PoolmonConfig::default()), Ok(()));
    }

    #[test]
    fn collects_every_error() {
        let mut config = PoolmonConfig::default();
        config.scan.ports = vec![110, 110];
        config.scan.ssl_ports = vec![0, 110];
        config.scan.timeout_secs = 0;
        config.observability.log_level = "loud".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::DuplicatePort(110),
                ValidationError::ZeroPort("ssl"),
                ValidationError::DuplicatePort(110),
                ValidationError::ZeroDuration("scan timeout"),
                ValidationError::LogLevel("loud".into()),
            ]
        );
    }

    #[test]
    fn oversized_durations_rejected() {
        let mut config = PoolmonConfig::default();
        config.scan.timeout_secs = u64::MAX / 2;
        config.scan.interval_secs = MAX_DURATION_SECS;
        config.director.timeout_secs = MAX_DURATION_SECS + 1;

        assert_eq!(
            validate_config(&config),
            Err(vec![
                ValidationError::DurationTooLong("scan timeout", u64::MAX / 2),
                ValidationError::DurationTooLong("director timeout", MAX_DURATION_SECS + 1),
            ])
        );
    }

    #[test]
    fn empty_plain_ports_rejected() {
        let mut config = PoolmonConfig::default();
        config.scan.ports.clear();
        config.scan.ssl_ports = vec![993];
        assert_eq!(validate_config(&config), Err(vec![ValidationError::NoPorts]));
    }

    #[test]
    fn metrics_address_checked_only_when_enabled() {
        let mut config = PoolmonConfig::default();
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::MetricsAddress("nowhere".into())])
        );
    }
}
