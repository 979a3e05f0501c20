//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Write timestamped lines to stderr or an append-only log file
//! - Reopen the log file on reload so external rotation works
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` overrides the configured level
//! - The file handle sits behind a mutex; a reopen swaps it between events

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Where log lines go.
#[derive(Debug, Clone, Default)]
pub struct LogSink {
    file: Option<Arc<LogFile>>,
}

#[derive(Debug)]
struct LogFile {
    path: PathBuf,
    handle: Mutex<File>,
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

impl LogSink {
    pub fn stderr() -> Self {
        Self::default()
    }

    /// Append to `path`, creating it if needed.
    pub fn file(path: &Path) -> io::Result<Self> {
        let handle = open_append(path)?;
        Ok(Self {
            file: Some(Arc::new(LogFile {
                path: path.to_path_buf(),
                handle: Mutex::new(handle),
            })),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.file.as_ref().map(|f| f.path.as_path())
    }

    /// Reopen the log file by path. A no-op for stderr.
    ///
    /// On failure the old handle stays in use.
    pub fn reopen(&self) -> io::Result<()> {
        let Some(file) = &self.file else {
            return Ok(());
        };
        let fresh = open_append(&file.path)?;
        *lock(&file.handle) = fresh;
        Ok(())
    }
}

fn lock(handle: &Mutex<File>) -> MutexGuard<'_, File> {
    handle.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Writer for one log event.
pub enum SinkWriter<'a> {
    Stderr(io::Stderr),
    File(MutexGuard<'a, File>),
}

impl Write for SinkWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            SinkWriter::Stderr(w) => w.write(buf),
            SinkWriter::File(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            SinkWriter::Stderr(w) => w.flush(),
            SinkWriter::File(w) => w.flush(),
        }
    }
}

impl<'a> MakeWriter<'a> for LogSink {
    type Writer = SinkWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        match &self.file {
            Some(file) => SinkWriter::File(lock(&file.handle)),
            None => SinkWriter::Stderr(io::stderr()),
        }
    }
}

/// Open the configured sink and install the global subscriber.
pub fn init_logging(config: &ObservabilityConfig) -> io::Result<LogSink> {
    let sink = match &config.log_file {
        Some(path) => LogSink::file(path)?,
        None => LogSink::stderr(),
    };

    let level = config.log_level.to_ascii_lowercase();
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("poolmon={}", level).into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(sink.path().is_none())
                .with_writer(sink.clone()),
        )
        .init();

    Ok(sink)
}
