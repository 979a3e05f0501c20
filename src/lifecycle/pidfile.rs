//! Single-instance pidfile.
//!
//! The file is held open with an exclusive `flock` for the life of the
//! process. A second instance fails to take the lock and reports the pid
//! written by the first. The file is removed on drop.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("cannot open pidfile {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("another instance holds {path:?} (pid {pid})")]
    AlreadyRunning { path: PathBuf, pid: String },

    #[error("cannot write pidfile {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A locked pidfile; released and removed on drop.
#[derive(Debug)]
pub struct PidFile {
    path: PathBuf,
    /// Holds the lock; closing it releases the lock.
    _file: File,
}

impl PidFile {
    /// Lock `path` and record the current pid in it.
    pub fn acquire(path: &Path) -> Result<Self, LifecycleError> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|source| LifecycleError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        // SAFETY: the descriptor is owned by `file` and stays open for the call.
        let locked = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) } == 0;
        if !locked {
            let mut pid = String::new();
            let _ = file.read_to_string(&mut pid);
            return Err(LifecycleError::AlreadyRunning {
                path: path.to_path_buf(),
                pid: pid.trim().to_string(),
            });
        }

        let write = |file: &mut File| -> io::Result<()> {
            file.set_len(0)?;
            file.seek(SeekFrom::Start(0))?;
            writeln!(file, "{}", std::process::id())?;
            file.sync_all()
        };
        write(&mut file).map_err(|source| LifecycleError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            _file: file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!(path = ?self.path, error = %e, "Failed to remove pidfile");
        }
    }
}
