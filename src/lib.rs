pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod validation;

pub use config::{Config, HiveConfig};
pub use error::{HiveError, HiveResult, TransportSignal};
pub use models::*;
pub use services::*;
