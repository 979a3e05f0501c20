//! Restore weight registry.
//!
//! # Responsibilities
//! - Map backend addresses to the weight they are restored to when re-enabled
//! - Rebuild the mapping from the weight file on demand
//! - Serve lookups concurrently with reloads
//!
//! # Design Decisions
//! - The table is rebuilt wholesale and published with a single `ArcSwap` store;
//!   readers see either the old or the new table, never a mix
//! - A file that cannot be read leaves the current table in place
//! - Bad lines and unresolvable names are reported and skipped

use std::collections::HashMap;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::observability::metrics;
use crate::weights::parser::{parse_line, WeightTarget};
use crate::weights::resolver::HostResolver;
use crate::weights::WeightError;

/// Weight given to a re-enabled host with no override.
pub const DEFAULT_WEIGHT: u32 = 100;

/// Resolved address → restore weight.
pub type WeightTable = HashMap<IpAddr, u32>;

/// Outcome of building a table from a weight source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Addresses in the new table.
    pub addresses: usize,
    /// Lines skipped as malformed or unresolvable.
    pub skipped: usize,
}

/// Shared, atomically reloadable weight table.
///
/// Cloning is cheap; clones observe the same table.
#[derive(Debug, Clone)]
pub struct WeightRegistry {
    table: Arc<ArcSwap<WeightTable>>,
    source: Option<PathBuf>,
}

impl WeightRegistry {
    /// An empty registry reading overrides from `source` on reload.
    pub fn new(source: Option<PathBuf>) -> Self {
        Self {
            table: Arc::new(ArcSwap::from_pointee(WeightTable::new())),
            source,
        }
    }

    /// Restore weight for `host`, or [`DEFAULT_WEIGHT`] without an override.
    pub fn resolve(&self, host: &str) -> u32 {
        host.parse::<IpAddr>()
            .ok()
            .and_then(|ip| self.table.load().get(&ip).copied())
            .unwrap_or(DEFAULT_WEIGHT)
    }

    /// Number of addresses with an override.
    pub fn len(&self) -> usize {
        self.table.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The current table.
    pub fn snapshot(&self) -> Arc<WeightTable> {
        self.table.load_full()
    }

    /// Replace the table with one built from `text`.
    pub async fn load_str<R: HostResolver>(&self, text: &str, resolver: &R) -> LoadReport {
        let (table, report) = build_table(text, resolver).await;
        self.publish(table);
        report
    }

    /// Re-read the configured source and swap the result in.
    ///
    /// Without a source there is nothing to do. If the source cannot be read
    /// the current table is kept and the error returned.
    pub async fn reload<R: HostResolver>(&self, resolver: &R) -> Result<LoadReport, WeightError> {
        let Some(path) = &self.source else {
            return Ok(LoadReport::default());
        };

        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| WeightError::Io {
                path: path.clone(),
                source,
            })?;

        let report = self.load_str(&text, resolver).await;
        tracing::info!(
            path = %path.display(),
            addresses = report.addresses,
            skipped = report.skipped,
            "Weight file loaded"
        );
        Ok(report)
    }

    fn publish(&self, table: WeightTable) {
        metrics::record_weight_entries(table.len());
        self.table.store(Arc::new(table));
    }
}

/// Parse and resolve a weight source into a fresh table.
pub async fn build_table<R: HostResolver>(text: &str, resolver: &R) -> (WeightTable, LoadReport) {
    let mut table = WeightTable::new();
    let mut skipped = 0;

    for (idx, line) in text.lines().enumerate() {
        let entry = match parse_line(idx + 1, line) {
            Ok(Some(entry)) => entry,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping weight entry");
                skipped += 1;
                continue;
            }
        };

        match entry.target {
            WeightTarget::Address(ip) => {
                table.insert(ip, entry.weight);
            }
            WeightTarget::Hostname(name) => {
                let ips = match resolver.lookup(&name).await {
                    Ok(ips) if !ips.is_empty() => ips,
                    Ok(_) => {
                        let e = WeightError::Unresolved { name, reason: "no addresses".into() };
                        tracing::warn!(error = %e, "Skipping weight entry");
                        skipped += 1;
                        continue;
                    }
                    Err(err) => {
                        let e = WeightError::Unresolved { name, reason: err.to_string() };
                        tracing::warn!(error = %e, "Skipping weight entry");
                        skipped += 1;
                        continue;
                    }
                };
                tracing::debug!(host = %name, addresses = ips.len(), weight = entry.weight, "Resolved weight entry");
                for ip in ips {
                    table.insert(ip, entry.weight);
                }
            }
        }
    }

    let report = LoadReport {
        addresses: table.len(),
        skipped,
    };
    (table, report)
}
