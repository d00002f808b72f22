use credit_approval_core::PipelineError;
use credit_approval_data::Schema;
use credit_approval_io::IoResult;
use credit_approval_linear::Solver;
use credit_approval_pipeline::ParameterGrid;
use credit_approval_preprocessing::DEFAULT_MISSING_TOKEN;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Every tunable of a run. Missing JSON fields take the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub missing_token: String,
    pub delimiter: char,
    pub schema: Schema,
    pub test_ratio: f64,
    pub seed: u64,
    /// Inverse regularisation strength of the classifier.
    pub c: f64,
    pub tol: f64,
    pub max_iter: usize,
    pub solver: Solver,
    /// Step size, used only by [`Solver::GradientDescent`].
    pub learning_rate: f64,
    pub tol_grid: Vec<f64>,
    pub max_iter_grid: Vec<usize>,
    pub cv_folds: usize,
    /// Rows shown at each end of the data preview.
    pub preview_rows: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            missing_token: DEFAULT_MISSING_TOKEN.to_string(),
            delimiter: ',',
            schema: Schema::credit_approval(),
            test_ratio: 0.33,
            seed: 42,
            c: 1.0,
            tol: 1e-4,
            max_iter: 100,
            solver: Solver::Newton,
            learning_rate: 0.5,
            tol_grid: vec![0.01, 0.001, 0.0001],
            max_iter_grid: vec![100, 150, 200],
            cv_folds: 5,
            preview_rows: 5,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> IoResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON config file.
    pub fn load<P: AsRef<Path>>(path: P) -> IoResult<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// The delimiter as the single byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> IoResult<u8> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(PipelineError::InvalidParameter(format!(
                "delimiter must be an ASCII character, got {:?}",
                self.delimiter
            ))
            .into())
        }
    }

    pub fn param_grid(&self) -> ParameterGrid {
        ParameterGrid {
            tol: self.tol_grid.clone(),
            max_iter: self.max_iter_grid.clone(),
        }
    }
}
