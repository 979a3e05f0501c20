//! Director pool monitor.
//!
//! Keeps the director's view of its backend pool in line with reality:
//! hosts that stop answering are taken out of rotation, hosts that come
//! back are restored.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────┐
//!   │                            POOLMON                               │
//!   │                                                                  │
//!   │   interval tick                                                  │
//!   │        │                                                         │
//!   │        ▼                                                         │
//!   │  ┌────────────┐  HOST-LIST   ┌──────────┐                        │
//!   │  │    scan    │─────────────▶│ director │◀──── unix socket ──────┼──▶ Director
//!   │  │orchestrator│◀─────────────│  client  │                        │
//!   │  └─────┬──────┘  host table  └──────────┘                        │
//!   │        │ one task per host         ▲                             │
//!   │        ▼                           │ HOST-SET / HOST-FLUSH       │
//!   │  ┌────────────┐                    │                             │
//!   │  │   health   │── banner checks ───┼─────────────────────────────┼──▶ Backends
//!   │  │  scanner   │   (plain, then TLS)│                             │
//!   │  └─────┬──────┘                    │                             │
//!   │        │ verdicts (barrier)        │                             │
//!   │        ▼                           │                             │
//!   │  ┌────────────┐  restore weight ┌──┴───────┐                     │
//!   │  │  decisions │◀────────────────│ weights  │◀── SIGHUP / file    │
//!   │  └────────────┘                 └──────────┘                     │
//!   └──────────────────────────────────────────────────────────────────┘
//! ```

use clap::Parser;

use poolmon::config::Cli;
use poolmon::lifecycle::startup;
use poolmon::observability::logging::init_logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.resolve()?;

    let sink = init_logging(&config.observability)?;

    tracing::info!("poolmon v{} starting", env!("CARGO_PKG_VERSION"));

    if let Err(e) = startup::run(config, sink).await {
        tracing::error!(error = %e, "Startup failed");
        return Err(e.into());
    }

    Ok(())
}
