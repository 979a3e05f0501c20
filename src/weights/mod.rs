//! Restore weight subsystem.
//!
//! # Data Flow
//! ```text
//! Startup / SIGHUP / file change (watcher.rs):
//!     weight file
//!     → parser.rs (ip:weight, hostname:weight, # comments)
//!     → resolver.rs (hostname → addresses)
//!     → registry.rs builds a fresh table
//!     → atomic swap
//!
//! Scan cycle:
//!     host re-enabled → registry.resolve(address) → override or 100
//! ```
//!
//! # Design Decisions
//! - No file, or an address without an entry, means the default weight
//! - A partially bad file still loads; only the bad lines are dropped

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub mod parser;
pub mod registry;
pub mod resolver;
pub mod watcher;

pub use registry::{LoadReport, WeightRegistry, WeightTable, DEFAULT_WEIGHT};
pub use resolver::{HostResolver, StaticResolver, SystemResolver};
pub use watcher::WeightWatcher;

/// Problems loading the weight file.
#[derive(Debug, Error)]
pub enum WeightError {
    /// The file could not be read; the table was left untouched.
    #[error("cannot read weight file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A line is neither a comment nor `target:weight`.
    #[error("malformed weight entry on line {line}: {content:?}")]
    Malformed { line: usize, content: String },

    /// A hostname entry did not resolve.
    #[error("cannot resolve weight entry {name}: {reason}")]
    Unresolved { name: String, reason: String },
}
