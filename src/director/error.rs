//! Director protocol error definitions.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors that end a director session.
///
/// A malformed `HOST-LIST` record is not one of them: such records are
/// dropped and the listing continues.
#[derive(Debug, Error)]
pub enum DirectorError {
    /// The administrative socket could not be reached.
    #[error("cannot connect to director socket {path:?}: {source}")]
    Connect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The director answered the version handshake with a different line.
    #[error("director handshake mismatch: expected {expected:?}, received {received:?}")]
    Handshake { expected: String, received: String },

    /// Reading or writing the session failed.
    #[error("director I/O error: {0}")]
    Io(#[from] io::Error),

    /// The director did not answer within the configured bound.
    #[error("director did not answer within {0:?}")]
    Timeout(Duration),

    /// The director hung up before the exchange was complete.
    #[error("director closed the connection")]
    Closed,
}
