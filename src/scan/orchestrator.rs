//! Scan cycle orchestration.
//!
//! # Responsibilities
//! - Fetch the host list from the director once per cycle
//! - Scan every host concurrently, one task per host
//! - Apply enable/disable decisions once every scan has reported
//!
//! # Design Decisions
//! - Verdicts are collected in completion order, but no action starts until
//!   the last one is in
//! - A task that panics or overruns its deadline counts as a lost scan,
//!   which is treated as unhealthy
//! - One host's failed scan or failed action never affects another host
//! - A failed host listing skips the cycle; the next tick retries

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::time::{self, MissedTickBehavior};

use crate::director::{Director, HostRecord};
use crate::health::Scanner;
use crate::lifecycle::ShutdownListener;
use crate::observability::metrics;
use crate::scan::verdict::{Action, ScanOutcome, ScanVerdict};
use crate::weights::WeightRegistry;

/// Slack on top of the scanner's own budget before a scan is declared lost.
const LOST_SCAN_GRACE: Duration = Duration::from_secs(2);

/// Summary of one cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// The host list could not be fetched; nothing else happened.
    pub skipped: bool,
    pub listed: usize,
    pub healthy: usize,
    pub unhealthy: usize,
    pub lost: usize,
    pub enabled: usize,
    pub disabled: usize,
    pub failed_actions: usize,
}

/// Drives scan cycles against a director.
pub struct Orchestrator<D, S> {
    director: D,
    scanner: Arc<S>,
    weights: WeightRegistry,
    dry_run: bool,
    grace: Duration,
}

impl<D, S> Orchestrator<D, S>
where
    D: Director,
    S: Scanner,
{
    pub fn new(director: D, scanner: S, weights: WeightRegistry) -> Self {
        Self {
            director,
            scanner: Arc::new(scanner),
            weights,
            dry_run: false,
            grace: LOST_SCAN_GRACE,
        }
    }

    /// Decide but do not write to the director.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Override the slack allowed past the scanner's budget.
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub fn director(&self) -> &D {
        &self.director
    }

    /// Run a cycle every `interval` until `shutdown` fires.
    ///
    /// Shutdown is only observed between cycles; a running cycle finishes.
    /// A stop requested before the loop starts means no cycle runs at all.
    pub async fn run(self, interval: Duration, mut shutdown: ShutdownListener) {
        tracing::info!(
            interval_secs = interval.as_secs(),
            dry_run = self.dry_run,
            "Pool monitor starting"
        );

        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.wait() => {
                    tracing::info!("Pool monitor received shutdown signal, exiting loop");
                    break;
                }
                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
            }
        }
    }

    /// List, scan and apply once.
    pub async fn run_cycle(&self) -> CycleReport {
        let started = Instant::now();

        let hosts = match self.director.list_hosts().await {
            Ok(hosts) => hosts,
            Err(e) => {
                tracing::warn!(error = %e, "Cannot list director hosts, skipping cycle");
                let report = CycleReport {
                    skipped: true,
                    ..CycleReport::default()
                };
                metrics::record_cycle(&report, started.elapsed());
                return report;
            }
        };

        let verdicts = self.scan_all(hosts).await;

        let mut report = CycleReport {
            listed: verdicts.len(),
            ..CycleReport::default()
        };
        for verdict in &verdicts {
            match &verdict.outcome {
                ScanOutcome::Healthy => report.healthy += 1,
                ScanOutcome::Unhealthy(_) => report.unhealthy += 1,
                ScanOutcome::Lost(reason) => {
                    tracing::error!(host = %verdict.host, reason = %reason, "Scan lost, treating host as unhealthy");
                    report.lost += 1;
                }
            }
            metrics::record_host_health(&verdict.host, verdict.outcome.is_healthy());

            if let Some(action) = verdict.decide(&self.weights) {
                self.apply(&action, verdict, &mut report).await;
            }
        }

        tracing::debug!(
            listed = report.listed,
            healthy = report.healthy,
            unhealthy = report.unhealthy,
            lost = report.lost,
            enabled = report.enabled,
            disabled = report.disabled,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Scan cycle complete"
        );
        metrics::record_cycle(&report, started.elapsed());
        metrics::record_weight_entries(self.weights.len());
        report
    }

    /// Scan every host concurrently and wait for all of them.
    async fn scan_all(&self, hosts: Vec<HostRecord>) -> Vec<ScanVerdict> {
        let deadline = self.scanner.budget().saturating_add(self.grace);

        let mut pending: FuturesUnordered<_> = hosts
            .into_iter()
            .map(|record| {
                let scanner = Arc::clone(&self.scanner);
                let host = record.address.clone();
                let handle = tokio::spawn(async move { scanner.scan(&host).await });
                let abort = handle.abort_handle();

                async move {
                    let outcome = match time::timeout(deadline, handle).await {
                        Ok(Ok(Ok(()))) => ScanOutcome::Healthy,
                        Ok(Ok(Err(failure))) => ScanOutcome::Unhealthy(failure),
                        Ok(Err(join_error)) => ScanOutcome::Lost(join_error.to_string()),
                        Err(_) => {
                            abort.abort();
                            ScanOutcome::Lost(format!("no verdict within {:?}", deadline))
                        }
                    };
                    ScanVerdict {
                        host: record.address,
                        prior_weight: record.weight,
                        outcome,
                    }
                }
            })
            .collect();

        let mut verdicts = Vec::with_capacity(pending.len());
        while let Some(verdict) = pending.next().await {
            tracing::trace!(host = %verdict.host, outcome = %verdict.outcome, "Scan finished");
            verdicts.push(verdict);
        }
        verdicts
    }

    async fn apply(&self, action: &Action, verdict: &ScanVerdict, report: &mut CycleReport) {
        if self.dry_run {
            tracing::info!(host = %action.host(), action = action.name(), reason = %verdict.outcome, "Dry run, not changing director");
            return;
        }

        let result = match action {
            Action::Enable { host, weight } => self.director.enable(host, *weight).await,
            Action::Disable { host } => self.director.disable(host).await,
        };

        match (action, result) {
            (Action::Enable { host, weight }, Ok(())) => {
                tracing::info!(host = %host, weight = *weight, "Host healthy, enabled");
                report.enabled += 1;
            }
            (Action::Disable { host }, Ok(())) => {
                tracing::warn!(host = %host, reason = %verdict.outcome, "Host unhealthy, disabled and flushed");
                report.disabled += 1;
            }
            (action, Err(e)) => {
                tracing::error!(host = %action.host(), action = action.name(), error = %e, "Director update failed");
                report.failed_actions += 1;
                metrics::record_action(action.name(), false);
                return;
            }
        }
        metrics::record_action(action.name(), true);
    }
}
