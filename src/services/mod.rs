pub mod database;
pub mod ddl;
pub mod executor;
pub mod materializer;
pub mod schema_reflector;
pub mod session;
pub mod thrift_client;

#[cfg(test)]
pub(crate) mod testing;

pub use database::*;
pub use ddl::*;
pub use executor::*;
pub use materializer::*;
pub use schema_reflector::*;
pub use session::*;
pub use thrift_client::*;
