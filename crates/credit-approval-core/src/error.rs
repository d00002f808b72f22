use thiserror::Error;

/// Error type shared by every stage of the credit-approval pipeline.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("Index out of bounds: index {index} for axis {axis} with size {size}")]
    IndexOutOfBounds {
        index: usize,
        axis: usize,
        size: usize,
    },

    #[error("Invalid axis: {axis} for tensor with {ndim} dimensions")]
    InvalidAxis { axis: usize, ndim: usize },

    #[error("Column '{column}' has no present values")]
    EmptyColumn { column: String },

    #[error("Column '{column}' has zero range (max == min); cannot min-max scale")]
    ZeroRange { column: String },

    #[error("Column '{column}' has a non-finite range; cannot min-max scale")]
    NonFiniteRange { column: String },

    #[error("Column '{column}': category '{value}' was not seen during fit")]
    UnknownCategory { column: String, value: String },

    #[error("Column '{column}', row {row}: cannot parse '{value}' as a number")]
    ParseNumber {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Singular matrix: cannot invert or decompose")]
    SingularMatrix,

    #[error("{0} must be fitted before use")]
    NotFitted(&'static str),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
