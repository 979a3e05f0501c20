//! Director pool health monitor library.

pub mod config;
pub mod director;
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod scan;
pub mod weights;

pub use config::schema::PoolmonConfig;
pub use director::{Director, DirectorClient};
pub use health::{HealthScanner, Scanner};
pub use lifecycle::Shutdown;
pub use scan::Orchestrator;
pub use weights::WeightRegistry;
