//! Per-host health scanning.
//!
//! # Responsibilities
//! - Run every configured port check for one host, plain ports first
//! - Stop at the first failing port
//!
//! # Design Decisions
//! - Port checks are sequential within a host; hosts are scanned concurrently
//!   by the orchestrator
//! - Encrypted ports are only tried once every plain port has passed
//! - The verdict is the AND over all ports; order only saves work

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio_rustls::TlsConnector;

use crate::config::ScanConfig;
use crate::health::probe::{check_plain, check_tls, ProbeError};

/// The first port that failed for a host.
#[derive(Debug)]
pub struct PortFailure {
    pub port: u16,
    pub tls: bool,
    pub error: ProbeError,
}

impl fmt::Display for PortFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.tls { "ssl port" } else { "port" };
        write!(f, "{} {}: {}", kind, self.port, self.error)
    }
}

/// Decides whether one host is healthy.
pub trait Scanner: Send + Sync + 'static {
    /// `Ok(())` when every port passed, otherwise the first failure.
    fn scan(&self, host: &str) -> impl Future<Output = Result<(), PortFailure>> + Send;

    /// Longest a single `scan` may legitimately take.
    fn budget(&self) -> Duration;
}

/// Banner checks over plain and TLS ports.
#[derive(Clone)]
pub struct HealthScanner {
    ports: Vec<u16>,
    ssl_ports: Vec<u16>,
    timeout: Duration,
    tls: TlsConnector,
}

impl fmt::Debug for HealthScanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HealthScanner")
            .field("ports", &self.ports)
            .field("ssl_ports", &self.ssl_ports)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HealthScanner {
    pub fn new(ports: Vec<u16>, ssl_ports: Vec<u16>, timeout: Duration, tls: TlsConnector) -> Self {
        Self {
            ports,
            ssl_ports,
            timeout,
            tls,
        }
    }

    pub fn from_config(config: &ScanConfig, tls: TlsConnector) -> Self {
        Self::new(config.ports.clone(), config.ssl_ports.clone(), config.timeout(), tls)
    }

    /// Whether every configured port of `host` answers with a banner.
    pub async fn is_healthy(&self, host: &str) -> bool {
        self.scan(host).await.is_ok()
    }
}

impl Scanner for HealthScanner {
    async fn scan(&self, host: &str) -> Result<(), PortFailure> {
        for &port in &self.ports {
            match check_plain(host, port, self.timeout).await {
                Ok(banner) => tracing::trace!(host, port, banner = %banner, "Port check passed"),
                Err(error) => {
                    tracing::debug!(host, port, error = %error, "Port check failed");
                    return Err(PortFailure { port, tls: false, error });
                }
            }
        }

        for &port in &self.ssl_ports {
            match check_tls(host, port, self.timeout, &self.tls).await {
                Ok(banner) => tracing::trace!(host, port, banner = %banner, "SSL port check passed"),
                Err(error) => {
                    tracing::debug!(host, port, error = %error, "SSL port check failed");
                    return Err(PortFailure { port, tls: true, error });
                }
            }
        }

        Ok(())
    }

    fn budget(&self) -> Duration {
        let checks = u32::try_from(self.ports.len() + self.ssl_ports.len()).unwrap_or(u32::MAX);
        self.timeout.saturating_mul(checks.max(1))
    }
}
