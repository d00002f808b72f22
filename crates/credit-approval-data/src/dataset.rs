use credit_approval_core::{PipelineError, PipelineResult, Tensor};

/// Feature matrix and row-aligned label vector.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorDataset {
    pub features: Tensor<f64>,
    pub labels: Tensor<f64>,
    pub feature_names: Vec<String>,
}

impl TensorDataset {
    pub fn new(
        features: Tensor<f64>,
        labels: Tensor<f64>,
        feature_names: Vec<String>,
    ) -> PipelineResult<Self> {
        if features.ndim() != 2 || labels.ndim() != 1 {
            return Err(PipelineError::InvalidOperation(
                "features must be 2D and labels 1D".into(),
            ));
        }
        let rows = features.shape().dim(0)?;
        if rows != labels.numel() {
            return Err(PipelineError::ShapeMismatch {
                expected: vec![rows],
                got: vec![labels.numel()],
            });
        }
        let cols = features.shape().dim(1)?;
        if cols != feature_names.len() {
            return Err(PipelineError::ShapeMismatch {
                expected: vec![cols],
                got: vec![feature_names.len()],
            });
        }
        Ok(TensorDataset {
            features,
            labels,
            feature_names,
        })
    }

    pub fn len(&self) -> usize {
        self.labels.numel()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Rows at `indices`, features and labels kept aligned.
    pub fn subset(&self, indices: &[usize]) -> PipelineResult<TensorDataset> {
        Ok(TensorDataset {
            features: self.features.select_rows(indices)?,
            labels: self.labels.select_rows(indices)?,
            feature_names: self.feature_names.clone(),
        })
    }

    /// Same rows with a replacement feature matrix (e.g. after scaling).
    pub fn with_features(&self, features: Tensor<f64>) -> PipelineResult<TensorDataset> {
        TensorDataset::new(features, self.labels.clone(), self.feature_names.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TensorDataset {
        let x = Tensor::from_vec2d(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
        let y = Tensor::from_slice(&[0.0, 1.0, 0.0]);
        TensorDataset::new(x, y, vec!["a".into(), "b".into()]).unwrap()
    }

    #[test]
    fn test_rejects_misaligned_labels() {
        let x = Tensor::from_vec2d(&[vec![1.0], vec![2.0]]).unwrap();
        let y = Tensor::from_slice(&[0.0]);
        assert!(TensorDataset::new(x, y, vec!["a".into()]).is_err());
    }

    #[test]
    fn test_subset_keeps_alignment() {
        let ds = sample();
        let sub = ds.subset(&[2, 1]).unwrap();
        assert_eq!(sub.len(), 2);
        assert_eq!(sub.features.data(), &[5.0, 6.0, 3.0, 4.0]);
        assert_eq!(sub.labels.data(), &[0.0, 1.0]);
        assert_eq!(sub.n_features(), 2);
    }
}
