use credit_approval_core::{Float, PipelineError, PipelineResult, Tensor};
use tracing::debug;

/// Scale features to the [0, 1] range: `(x - min) / (max - min)` per column.
///
/// A column whose observed range is zero or not finite cannot be scaled and is reported
/// by `fit`.
pub struct MinMaxScaler<T: Float> {
    pub min: Option<Tensor<T>>,
    pub max: Option<Tensor<T>>,
    feature_names: Vec<String>,
}

impl<T: Float> MinMaxScaler<T> {
    pub fn new() -> Self {
        MinMaxScaler {
            min: None,
            max: None,
            feature_names: Vec::new(),
        }
    }

    /// Names used in error messages instead of positional column numbers.
    pub fn with_feature_names(mut self, names: &[String]) -> Self {
        self.feature_names = names.to_vec();
        self
    }

    fn column_name(&self, j: usize) -> String {
        self.feature_names
            .get(j)
            .cloned()
            .unwrap_or_else(|| format!("feature {}", j))
    }

    pub fn fit(&mut self, x: &Tensor<T>) -> PipelineResult<()> {
        let rows = x.shape().dim(0)?;
        let cols = x.shape().dim(1)?;
        if rows == 0 {
            return Err(PipelineError::InvalidOperation(
                "cannot fit a scaler on zero rows".into(),
            ));
        }

        let mut min_vals = vec![T::INFINITY; cols];
        let mut max_vals = vec![T::NEG_INFINITY; cols];

        for i in 0..rows {
            for (j, &v) in x.row_slice(i)?.iter().enumerate() {
                if !v.is_finite() {
                    return Err(PipelineError::NonFiniteRange {
                        column: self.column_name(j),
                    });
                }
                if v < min_vals[j] {
                    min_vals[j] = v;
                }
                if v > max_vals[j] {
                    max_vals[j] = v;
                }
            }
        }

        for j in 0..cols {
            if !(max_vals[j] - min_vals[j]).is_finite() {
                return Err(PipelineError::NonFiniteRange {
                    column: self.column_name(j),
                });
            }
            if max_vals[j] - min_vals[j] <= T::ZERO {
                return Err(PipelineError::ZeroRange {
                    column: self.column_name(j),
                });
            }
            debug!(column = %self.column_name(j), min = %min_vals[j], max = %max_vals[j], "scaler range");
        }

        self.min = Some(Tensor::from_slice(&min_vals));
        self.max = Some(Tensor::from_slice(&max_vals));
        Ok(())
    }

    /// Rescale with the fitted ranges. Values outside the fitted range are not clipped.
    pub fn transform(&self, x: &Tensor<T>) -> PipelineResult<Tensor<T>> {
        let (min, max) = match (&self.min, &self.max) {
            (Some(min), Some(max)) => (min.data(), max.data()),
            _ => return Err(PipelineError::NotFitted("MinMaxScaler")),
        };
        let rows = x.shape().dim(0)?;
        let cols = x.shape().dim(1)?;
        if cols != min.len() {
            return Err(PipelineError::ShapeMismatch {
                expected: vec![rows, min.len()],
                got: x.shape_vec(),
            });
        }

        let mut data = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for (j, &v) in x.row_slice(i)?.iter().enumerate() {
                data.push((v - min[j]) / (max[j] - min[j]));
            }
        }
        Tensor::new(data, vec![rows, cols])
    }

    pub fn fit_transform(&mut self, x: &Tensor<T>) -> PipelineResult<Tensor<T>> {
        self.fit(x)?;
        self.transform(x)
    }
}

impl<T: Float> Default for MinMaxScaler<T> {
    fn default() -> Self {
        Self::new()
    }
}
