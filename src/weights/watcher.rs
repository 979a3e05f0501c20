//! Weight file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;
use notify::{Watcher, RecursiveMode, Event, RecommendedWatcher, Config};
use tokio::sync::mpsc;

/// A watcher that signals when the weight file changes.
///
/// The parent directory is watched rather than the file itself, so editors
/// that replace the file by rename are still noticed.
pub struct WeightWatcher {
    path: PathBuf,
    change_tx: mpsc::UnboundedSender<()>,
}

impl WeightWatcher {
    /// Create a new WeightWatcher.
    ///
    /// Returns the watcher and a receiver that yields once per change.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<()>) {
        let (change_tx, change_rx) = mpsc::unbounded_channel();

        (Self {
            path: path.to_path_buf(),
            change_tx,
        }, change_rx)
    }

    /// Start watching in a background thread.
    ///
    /// The returned handle must be kept alive for as long as events are wanted.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.change_tx.clone();
        let file_name = self.path.file_name().map(|n| n.to_os_string());
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut watcher = RecommendedWatcher::new(move |res: notify::Result<Event>| {
            match res {
                Ok(event) => {
                    let relevant = event.kind.is_modify() || event.kind.is_create();
                    let ours = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if relevant && ours {
                        tracing::debug!("Weight file change detected");
                        let _ = tx.send(());
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            }
        }, Config::default().with_poll_interval(Duration::from_secs(2)))?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Weight file watcher started");
        Ok(watcher)
    }
}
