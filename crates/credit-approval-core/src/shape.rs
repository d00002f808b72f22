use crate::error::{PipelineError, PipelineResult};

/// Dimensions of a tensor. Only rank 1 (vectors) and rank 2 (row-major matrices) are used.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    pub fn new(dims: Vec<usize>) -> Self {
        Shape { dims }
    }

    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Size along a specific axis.
    pub fn dim(&self, axis: usize) -> PipelineResult<usize> {
        self.dims.get(axis).copied().ok_or(PipelineError::InvalidAxis {
            axis,
            ndim: self.ndim(),
        })
    }

    pub fn numel(&self) -> usize {
        self.dims.iter().product()
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn to_vec(&self) -> Vec<usize> {
        self.dims.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dim_and_numel() {
        let s = Shape::new(vec![690, 13]);
        assert_eq!(s.ndim(), 2);
        assert_eq!(s.dim(1).unwrap(), 13);
        assert_eq!(s.numel(), 690 * 13);
        assert!(matches!(s.dim(2), Err(PipelineError::InvalidAxis { axis: 2, ndim: 2 })));
    }
}
