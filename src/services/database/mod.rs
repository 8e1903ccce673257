// Database abstraction layer
pub mod adapter;
pub mod hive;

pub use adapter::DatabaseAdapter;
pub use hive::HiveAdapter;

use crate::config::HiveConfig;
use crate::error::HiveResult;

/// Factory function to create a connected adapter for the configured engine
pub fn create_adapter(config: HiveConfig) -> HiveResult<Box<dyn DatabaseAdapter>> {
    tracing::info!("Connecting to Hive at {} (database: {})", config.address(), config.database);
    let adapter = HiveAdapter::connect(config)?;
    tracing::info!("Successfully connected to Hive");
    Ok(Box::new(adapter))
}
