//! Scan orchestration subsystem.
//!
//! # Data Flow
//! ```text
//! Interval tick
//!     → director HOST-LIST
//!     → one task per host (health::Scanner)
//!     → barrier: every verdict collected
//!     → verdict.rs decides Enable / Disable / nothing
//!     → director HOST-SET (+ HOST-FLUSH)
//! ```

pub mod orchestrator;
pub mod verdict;

pub use orchestrator::{CycleReport, Orchestrator};
pub use verdict::{Action, ScanOutcome, ScanVerdict};
