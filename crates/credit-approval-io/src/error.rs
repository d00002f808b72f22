use credit_approval_core::PipelineError;
use thiserror::Error;

/// Errors from loading input or running the pipeline end to end.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("config error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("row {row} has {got} fields, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

pub type IoResult<T> = Result<T, IoError>;
