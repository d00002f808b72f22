pub mod error;
pub mod csv_io;
pub mod summary;

pub use error::{IoError, IoResult};
pub use csv_io::*;
pub use summary::*;
