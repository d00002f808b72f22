pub mod schema;
pub mod table;
pub mod dataset;

pub use schema::*;
pub use table::*;
pub use dataset::*;
