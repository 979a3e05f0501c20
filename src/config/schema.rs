//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the monitor.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the pool monitor.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PoolmonConfig {
    /// Director administrative socket settings.
    pub director: DirectorConfig,

    /// Backend port checks.
    pub scan: ScanConfig,

    /// Restore weight overrides.
    pub weights: WeightsConfig,

    /// Process lifecycle (pidfile).
    pub lifecycle: LifecycleConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Director connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DirectorConfig {
    /// Path to the director's administrative unix socket.
    pub socket: PathBuf,

    /// Bound on every read from the director, in seconds.
    pub timeout_secs: u64,
}

impl DirectorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            socket: PathBuf::from("/var/run/dovecot/director-admin"),
            timeout_secs: 10,
        }
    }
}

/// Scan configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Plain-text ports; each must answer with a banner line.
    pub ports: Vec<u16>,

    /// TLS-wrapped ports, checked only after every plain port passed.
    pub ssl_ports: Vec<u16>,

    /// Per-port connect + banner timeout in seconds.
    pub timeout_secs: u64,

    /// Seconds between scan cycles.
    pub interval_secs: u64,

    /// Log decisions without writing them to the director.
    pub dry_run: bool,
}

impl ScanConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            ports: default_ports(),
            ssl_ports: Vec::new(),
            timeout_secs: 5,
            interval_secs: 30,
            dry_run: false,
        }
    }
}

/// POP3 and IMAP.
pub fn default_ports() -> Vec<u16> {
    vec![110, 143]
}

/// Weight override file configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WeightsConfig {
    /// Optional `(ip|hostname):weight` file.
    pub file: Option<PathBuf>,

    /// Reload the file when it changes on disk, in addition to SIGHUP.
    pub watch: bool,
}

/// Lifecycle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Pidfile guarding against a second instance. Empty disables it.
    pub lockfile: Option<PathBuf>,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            lockfile: Some(PathBuf::from("/var/run/poolmon.pid")),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Append log lines to this file instead of stderr.
    pub log_file: Option<PathBuf>,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: None,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9109".to_string(),
        }
    }
}
