pub mod estimator;
pub mod model_selection;

pub use estimator::*;
pub use model_selection::*;
