//! # credit-approval
//!
//! Predicts whether a credit-card application is approved, from the UCI "Credit Approval"
//! table: clean it, encode it, scale it, fit a logistic-regression classifier and tune it.
//!
//! ## Modules
//!
//! - **core**: `Tensor`, the `Float` trait, `PipelineError`
//! - **linalg**: Cholesky decomposition and SPD solves for the Newton solver
//! - **data**: Column schema, raw and typed tables, `TensorDataset`
//! - **preprocessing**: Missing-token normalization, mean/mode imputation, label encoding,
//!   feature selection, MinMaxScaler, train/test split
//! - **linear**: Logistic regression (Newton or gradient descent)
//! - **metrics**: Accuracy, confusion matrix, precision/recall/F1
//! - **pipeline**: Estimator trait, stratified k-fold, grid search
//! - **io**: Headerless CSV reading, describe/info/preview summaries
//! - **datasets**: Seeded synthetic credit applications
//! - **config** / **workflow** / **report**: The end-to-end run and its printable result

/// Core tensor engine.
pub use credit_approval_core as core;

/// Linear algebra operations.
pub use credit_approval_linalg as linalg;

/// Schema and tables.
pub use credit_approval_data as data;

/// Data preprocessing.
pub use credit_approval_preprocessing as preprocessing;

/// Linear models.
pub use credit_approval_linear as linear;

/// Evaluation metrics.
pub use credit_approval_metrics as metrics;

/// Cross-validation and grid search.
pub use credit_approval_pipeline as pipeline;

/// I/O utilities.
pub use credit_approval_io as io;

/// Synthetic datasets.
pub use credit_approval_datasets as datasets;

pub mod config;
pub mod report;
pub mod workflow;

pub use config::PipelineConfig;
pub use report::Report;
pub use workflow::{run, run_file};
