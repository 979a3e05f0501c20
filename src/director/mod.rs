//! Director administrative protocol subsystem.
//!
//! # Data Flow
//! ```text
//! Scan cycle start:
//!     client.rs connects to the unix socket
//!     → session.rs handshake (VERSION echo)
//!     → HOST-LIST → Vec<HostRecord> (protocol.rs)
//!     → session closed
//!
//! Per decision:
//!     fresh session → HOST-SET (+ HOST-FLUSH when disabling) → closed
//! ```
//!
//! # Design Decisions
//! - One session per logical action; nothing is held open between cycles
//! - Writes are not acknowledged by the director
//! - The `Director` trait is the seam the scan orchestrator depends on

use std::future::Future;

pub mod client;
pub mod error;
pub mod protocol;
pub mod session;

pub use client::DirectorClient;
pub use error::DirectorError;
pub use protocol::HostRecord;
pub use session::Session;

/// The director operations a scan cycle needs.
pub trait Director: Send + Sync {
    /// Current host table.
    fn list_hosts(&self) -> impl Future<Output = Result<Vec<HostRecord>, DirectorError>> + Send;

    /// Put `host` back into service with `weight`.
    fn enable(&self, host: &str, weight: u32) -> impl Future<Output = Result<(), DirectorError>> + Send;

    /// Take `host` out of service: weight 0, then flush its assignments.
    fn disable(&self, host: &str) -> impl Future<Output = Result<(), DirectorError>> + Send;
}
