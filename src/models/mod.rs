pub mod comment;
pub mod metadata;
pub mod query;
pub mod table;

pub use comment::*;
pub use metadata::*;
pub use query::*;
pub use table::*;
