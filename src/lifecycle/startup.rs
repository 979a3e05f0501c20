//! Startup orchestration.
//!
//! # Responsibilities
//! - Take the pidfile and start the metrics exporter
//! - Load the weight file and wire up reload triggers
//! - Build the director client, scanner and orchestrator
//! - Run cycles until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - A missing or unreadable weight file is not a startup error
//! - Once the loop runs, nothing short of a stop signal ends the process

use std::net::SocketAddr;

use thiserror::Error;
use tokio::sync::{broadcast, mpsc};

use crate::config::PoolmonConfig;
use crate::director::DirectorClient;
use crate::health::{tls::liveness_connector, HealthScanner};
use crate::lifecycle::pidfile::{LifecycleError, PidFile};
use crate::lifecycle::shutdown::{Reload, Shutdown, ShutdownListener};
use crate::lifecycle::signals::spawn_signal_handlers;
use crate::observability::logging::LogSink;
use crate::observability::metrics;
use crate::scan::Orchestrator;
use crate::weights::{HostResolver, SystemResolver, WeightRegistry, WeightWatcher};

/// Errors that prevent the monitor from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("invalid metrics address {0:?}")]
    MetricsAddress(String),

    #[error("cannot start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("cannot install signal handlers: {0}")]
    Signals(#[source] std::io::Error),

    #[error("cannot build TLS client: {0}")]
    Tls(#[from] rustls::Error),

    #[error("cannot watch weight file: {0}")]
    Watch(#[from] notify::Error),
}

/// Run the monitor until a stop signal arrives.
pub async fn run(config: PoolmonConfig, sink: LogSink) -> Result<(), StartupError> {
    let _pidfile = match config
        .lifecycle
        .lockfile
        .as_deref()
        .filter(|p| !p.as_os_str().is_empty())
    {
        Some(path) => Some(PidFile::acquire(path)?),
        None => None,
    };

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr, config.scan.interval())?;
    }

    let shutdown = Shutdown::new();
    let reload = Reload::new();
    let stop = shutdown.subscribe();
    let signals = spawn_signal_handlers(shutdown.clone(), reload.clone())
        .map_err(StartupError::Signals)?;

    let weights = WeightRegistry::new(config.weights.file.clone());
    if let Err(e) = weights.reload(&SystemResolver).await {
        tracing::warn!(error = %e, "Weight file not loaded, restoring hosts to the default weight");
    }

    let (_watcher, changes) = match (&config.weights.file, config.weights.watch) {
        (Some(path), true) => {
            let (watcher, changes) = WeightWatcher::new(path);
            (Some(watcher.run()?), Some(changes))
        }
        _ => (None, None),
    };

    tokio::spawn(reload_weights(
        weights.clone(),
        SystemResolver,
        reload.subscribe(),
        changes,
        shutdown.subscribe(),
    ));
    tokio::spawn(reopen_logs(sink, reload.subscribe(), shutdown.subscribe()));

    let scanner = HealthScanner::from_config(&config.scan, liveness_connector()?);
    let director = DirectorClient::from_config(&config.director);
    tracing::info!(
        socket = %director.socket().display(),
        ports = ?config.scan.ports,
        ssl_ports = ?config.scan.ssl_ports,
        timeout_secs = config.scan.timeout_secs,
        weight_file = ?config.weights.file,
        "Configuration loaded"
    );

    let orchestrator =
        Orchestrator::new(director, scanner, weights).with_dry_run(config.scan.dry_run);
    orchestrator.run(config.scan.interval(), stop).await;

    signals.abort();
    tracing::info!("Shutdown complete");
    Ok(())
}

/// Rebuild the weight table on every reload trigger or file change.
pub async fn reload_weights<R: HostResolver>(
    weights: WeightRegistry,
    resolver: R,
    mut reload: broadcast::Receiver<()>,
    mut changes: Option<mpsc::UnboundedReceiver<()>>,
    mut shutdown: ShutdownListener,
) {
    loop {
        let file_changed = async {
            match changes.as_mut() {
                Some(rx) => rx.recv().await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            signal = reload.recv() => {
                if let Err(broadcast::error::RecvError::Closed) = signal {
                    break;
                }
            }
            change = file_changed => {
                if change.is_none() {
                    changes = None;
                    continue;
                }
            }
            _ = shutdown.wait() => break,
        }

        if let Err(e) = weights.reload(&resolver).await {
            tracing::error!(error = %e, "Weight reload failed, keeping previous weights");
        }
    }
}

/// Reopen the log file on every reload trigger.
pub async fn reopen_logs(
    sink: LogSink,
    mut reload: broadcast::Receiver<()>,
    mut shutdown: ShutdownListener,
) {
    loop {
        tokio::select! {
            signal = reload.recv() => {
                if let Err(broadcast::error::RecvError::Closed) = signal {
                    break;
                }
                if let Err(e) = sink.reopen() {
                    tracing::error!(error = %e, path = ?sink.path(), "Log file reopen failed");
                }
            }
            _ = shutdown.wait() => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weights::StaticResolver;
    use std::time::Duration;

    #[tokio::test]
    async fn reload_trigger_rebuilds_weights() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weights");
        std::fs::write(&path, "10.0.0.5:50\n").unwrap();

        let weights = WeightRegistry::new(Some(path.clone()));
        let reload = Reload::new();
        let shutdown = Shutdown::new();
        let task = tokio::spawn(reload_weights(
            weights.clone(),
            StaticResolver::new(),
            reload.subscribe(),
            None,
            shutdown.subscribe(),
        ));

        reload.trigger();
        let mut loaded = false;
        for _ in 0..50 {
            if weights.resolve("10.0.0.5") == 50 {
                loaded = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(loaded, "reload trigger should load the weight file");

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn file_change_rebuilds_weights() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weights");
        std::fs::write(&path, "10.0.0.5:30\n").unwrap();

        let weights = WeightRegistry::new(Some(path.clone()));
        let reload = Reload::new();
        let shutdown = Shutdown::new();
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(reload_weights(
            weights.clone(),
            StaticResolver::new(),
            reload.subscribe(),
            Some(rx),
            shutdown.subscribe(),
        ));

        tx.send(()).unwrap();
        let mut loaded = false;
        for _ in 0..50 {
            if weights.resolve("10.0.0.5") == 30 {
                loaded = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(loaded);
        shutdown.trigger();
    }

    #[tokio::test]
    async fn background_tasks_exit_when_stop_preceded_them() {
        let shutdown = Shutdown::new();
        let reload = Reload::new();
        shutdown.trigger();

        let weights = tokio::spawn(reload_weights(
            WeightRegistry::new(None),
            StaticResolver::new(),
            reload.subscribe(),
            None,
            shutdown.subscribe(),
        ));
        let logs = tokio::spawn(reopen_logs(
            LogSink::stderr(),
            reload.subscribe(),
            shutdown.subscribe(),
        ));

        tokio::time::timeout(Duration::from_secs(1), weights)
            .await
            .unwrap()
            .unwrap();
        tokio::time::timeout(Duration::from_secs(1), logs)
            .await
            .unwrap()
            .unwrap();
    }
}
