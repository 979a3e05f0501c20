//! Hostname resolution for weight file entries.

use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::net::IpAddr;

/// Expands a hostname into its addresses.
pub trait HostResolver: Send + Sync {
    fn lookup(&self, name: &str) -> impl Future<Output = io::Result<Vec<IpAddr>>> + Send;
}

/// Resolves through the system resolver (`getaddrinfo`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl HostResolver for SystemResolver {
    async fn lookup(&self, name: &str) -> io::Result<Vec<IpAddr>> {
        let mut ips: Vec<IpAddr> = tokio::net::lookup_host((name, 0))
            .await?
            .map(|addr| addr.ip())
            .collect();
        ips.sort();
        ips.dedup();
        Ok(ips)
    }
}

/// Resolves from a fixed name table; names not in the table fail.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    names: HashMap<String, Vec<IpAddr>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, ips: &[IpAddr]) -> Self {
        self.names.insert(name.to_ascii_lowercase(), ips.to_vec());
        self
    }
}

impl HostResolver for StaticResolver {
    async fn lookup(&self, name: &str) -> io::Result<Vec<IpAddr>> {
        self.names
            .get(&name.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("unknown host {}", name)))
    }
}
