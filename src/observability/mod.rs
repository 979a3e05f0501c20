//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stderr or the log file (reopened on SIGHUP)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Every enable/disable is an info/warn line; per-port detail is debug
//! - Metrics are cheap (atomic increments) and off unless configured

pub mod logging;
pub mod metrics;
