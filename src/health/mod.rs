//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! scanner.rs (one host):
//!     plain ports in order  → probe.rs connect + banner
//!     ssl ports in order    → probe.rs connect + TLS (tls.rs) + banner
//!     first failure         → PortFailure, remaining ports skipped
//! ```
//!
//! # Design Decisions
//! - A banner line is the liveness signal; a bare TCP accept is not enough
//! - Each check has its own deadline; hosts never wait on each other
//! - The `Scanner` trait is the seam the scan orchestrator depends on

pub mod probe;
pub mod scanner;
pub mod tls;

pub use probe::ProbeError;
pub use scanner::{HealthScanner, PortFailure, Scanner};
