//! Command-line surface.
//!
//! Every flag is optional; a flag that is given overrides the value from the
//! config file, which in turn overrides the built-in default.

use std::path::PathBuf;

use clap::Parser;

use crate::config::loader::{read_config, ConfigError};
use crate::config::schema::PoolmonConfig;
use crate::config::validation::validate_config;

#[derive(Debug, Parser)]
#[command(name = "poolmon")]
#[command(about = "Health-check the director's backend pool and enable/disable hosts", long_about = None)]
pub struct Cli {
    /// TOML config file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Plain port to check for a banner (repeatable).
    #[arg(short = 'p', long = "port")]
    pub ports: Vec<u16>,

    /// TLS port to check for a banner (repeatable).
    #[arg(short = 'S', long = "ssl")]
    pub ssl_ports: Vec<u16>,

    /// Per-port timeout in seconds.
    #[arg(short = 't', long = "timeout")]
    pub timeout: Option<u64>,

    /// Seconds between scans.
    #[arg(short = 'i', long = "interval")]
    pub interval: Option<u64>,

    /// Weight override file, `(ip|hostname):weight` per line.
    #[arg(short = 'w', long = "weightfile")]
    pub weight_file: Option<PathBuf>,

    /// Director administrative socket.
    #[arg(short = 's', long = "socket")]
    pub socket: Option<PathBuf>,

    /// Pidfile.
    #[arg(short = 'k', long = "lockfile")]
    pub lockfile: Option<PathBuf>,

    /// Log file; stderr when unset.
    #[arg(short = 'l', long = "logfile")]
    pub log_file: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Log decisions without changing the director.
    #[arg(short = 'n', long = "dry-run")]
    pub dry_run: bool,
}

impl Cli {
    /// Overlay the flags that were given onto `config`.
    pub fn apply(&self, config: &mut PoolmonConfig) {
        if !self.ports.is_empty() {
            config.scan.ports = self.ports.clone();
        }
        if !self.ssl_ports.is_empty() {
            config.scan.ssl_ports = self.ssl_ports.clone();
        }
        if let Some(timeout) = self.timeout {
            config.scan.timeout_secs = timeout;
        }
        if let Some(interval) = self.interval {
            config.scan.interval_secs = interval;
        }
        if let Some(path) = &self.weight_file {
            config.weights.file = Some(path.clone());
        }
        if let Some(path) = &self.socket {
            config.director.socket = path.clone();
        }
        if let Some(path) = &self.lockfile {
            config.lifecycle.lockfile = Some(path.clone());
        }
        if let Some(path) = &self.log_file {
            config.observability.log_file = Some(path.clone());
        }
        if self.debug {
            config.observability.log_level = "debug".to_string();
        }
        if self.dry_run {
            config.scan.dry_run = true;
        }
    }

    /// Build the effective configuration: defaults, then file, then flags.
    pub fn resolve(&self) -> Result<PoolmonConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => PoolmonConfig::default(),
        };
        self.apply(&mut config);
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}
