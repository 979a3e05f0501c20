//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define monitor metrics (cycles, host health, director writes)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `poolmon_cycles_total` (counter): cycles run, by result (complete, skipped)
//! - `poolmon_cycle_duration_seconds` (histogram): wall time per cycle
//! - `poolmon_hosts` (gauge): hosts per outcome in the last cycle
//! - `poolmon_host_healthy` (gauge): 1=healthy, 0=unhealthy, per host
//! - `poolmon_actions_total` (counter): director writes by action and result
//! - `poolmon_weight_entries` (gauge): addresses with a weight override
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Exporter is opt-in; the monitor is usually scraped via its log
//! - Gauges not refreshed within a few scan intervals are dropped, so hosts
//!   the director no longer lists disappear from `poolmon_host_healthy`

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use metrics_util::MetricKindMask;

use crate::scan::CycleReport;

/// Scan intervals a gauge may go without an update before it is dropped.
const GAUGE_IDLE_INTERVALS: u32 = 3;

/// Install the Prometheus exporter listening on `addr`.
///
/// Gauges left untouched for a few scan `interval`s are dropped from the output.
pub fn init_metrics(addr: SocketAddr, interval: Duration) -> Result<(), BuildError> {
    builder(gauge_idle_timeout(interval))
        .with_http_listener(addr)
        .install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

fn builder(gauge_idle: Duration) -> PrometheusBuilder {
    PrometheusBuilder::new().idle_timeout(MetricKindMask::GAUGE, Some(gauge_idle))
}

fn gauge_idle_timeout(interval: Duration) -> Duration {
    interval.saturating_mul(GAUGE_IDLE_INTERVALS)
}

pub fn record_cycle(report: &CycleReport, elapsed: Duration) {
    let result = if report.skipped { "skipped" } else { "complete" };
    metrics::counter!("poolmon_cycles_total", "result" => result).increment(1);
    metrics::histogram!("poolmon_cycle_duration_seconds").record(elapsed.as_secs_f64());

    if !report.skipped {
        metrics::gauge!("poolmon_hosts", "outcome" => "healthy").set(report.healthy as f64);
        metrics::gauge!("poolmon_hosts", "outcome" => "unhealthy").set(report.unhealthy as f64);
        metrics::gauge!("poolmon_hosts", "outcome" => "lost").set(report.lost as f64);
    }
}

pub fn record_host_health(host: &str, healthy: bool) {
    metrics::gauge!("poolmon_host_healthy", "host" => host.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}

pub fn record_action(action: &'static str, ok: bool) {
    let result = if ok { "ok" } else { "error" };
    metrics::counter!("poolmon_actions_total", "action" => action, "result" => result).increment(1);
}

pub fn record_weight_entries(count: usize) {
    metrics::gauge!("poolmon_weight_entries").set(count as f64);
}
