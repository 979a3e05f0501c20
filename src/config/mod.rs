//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (schema.rs)
//!     → optional TOML file (loader.rs)
//!     → command-line flags (cli.rs)
//!     → validation.rs (semantic checks)
//!     → PoolmonConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; only the weight table reloads at runtime
//! - All fields have defaults to allow running with no file and no flags
//! - Validation separates syntactic (serde, clap) from semantic checks

pub mod cli;
pub mod loader;
pub mod schema;
pub mod validation;

pub use cli::Cli;
pub use loader::ConfigError;
pub use schema::PoolmonConfig;
pub use schema::DirectorConfig;
pub use schema::ScanConfig;
pub use schema::WeightsConfig;
pub use schema::ObservabilityConfig;
