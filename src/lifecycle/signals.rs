//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGTERM, SIGINT, SIGHUP)
//! - Translate signals to internal events
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - SIGTERM/SIGINT trigger shutdown; the current cycle is allowed to finish
//! - Shutdown is level-triggered, so a signal that lands during startup is kept
//! - SIGHUP triggers a reload (weights, log file), never a shutdown

use std::io;

use tokio::signal::unix::{signal, SignalKind};
use tokio::task::JoinHandle;

use crate::lifecycle::shutdown::{Reload, Shutdown};

/// Install handlers and forward signals to `shutdown` and `reload`.
///
/// The handlers stay installed until the returned task is aborted, so a
/// repeated stop signal is absorbed rather than killing a running cycle.
pub fn spawn_signal_handlers(shutdown: Shutdown, reload: Reload) -> io::Result<JoinHandle<()>> {
    let mut term = signal(SignalKind::terminate())?;
    let mut int = signal(SignalKind::interrupt())?;
    let mut hup = signal(SignalKind::hangup())?;

    Ok(tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = term.recv() => {
                    tracing::info!("SIGTERM received, stopping after the current cycle");
                    shutdown.trigger();
                }
                _ = int.recv() => {
                    tracing::info!("SIGINT received, stopping after the current cycle");
                    shutdown.trigger();
                }
                _ = hup.recv() => {
                    tracing::info!("SIGHUP received, reloading");
                    reload.trigger();
                }
            }
        }
    }))
}
