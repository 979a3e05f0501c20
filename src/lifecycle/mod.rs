//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → pidfile → metrics → signals → weights → scan loop
//!
//! Shutdown (shutdown.rs):
//!     Signal received → current cycle finishes → loop exits → pidfile removed
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!     SIGHUP → Trigger reload (weight table, log file)
//! ```
//!
//! # Design Decisions
//! - Ordered startup: pidfile first, so a second instance does nothing
//! - Stop requests are honoured between cycles, never mid-cycle
//! - The process runs in the foreground; supervision is left to the service manager

pub mod pidfile;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use pidfile::{LifecycleError, PidFile};
pub use shutdown::{Reload, Shutdown, ShutdownListener};
