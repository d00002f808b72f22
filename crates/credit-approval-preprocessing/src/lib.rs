pub mod missing;
pub mod imputer;
pub mod encoder;
pub mod selection;
pub mod scaler;
pub mod split;

pub use missing::*;
pub use imputer::*;
pub use encoder::*;
pub use selection::*;
pub use scaler::*;
pub use split::*;
