use credit_approval_core::{Float, PipelineError, PipelineResult, Tensor};

/// Lower-triangular factor `L` of a symmetric positive-definite matrix `A = L * Lᵀ`.
#[derive(Debug, Clone)]
pub struct CholeskyDecomposition<T: Float> {
    pub l: Tensor<T>,
}

fn require_square<T: Float>(a: &Tensor<T>, op: &str) -> PipelineResult<usize> {
    if a.ndim() != 2 {
        return Err(PipelineError::InvalidOperation(format!("{} requires a 2D tensor", op)));
    }
    let n = a.shape().dim(0)?;
    if n != a.shape().dim(1)? {
        return Err(PipelineError::InvalidOperation(format!("{} requires a square matrix", op)));
    }
    Ok(n)
}

/// Cholesky decomposition for symmetric positive-definite matrices.
pub fn cholesky<T: Float>(a: &Tensor<T>) -> PipelineResult<CholeskyDecomposition<T>> {
    let n = require_square(a, "cholesky")?;
    let a_data = a.data();
    let mut l_data = vec![T::ZERO; n * n];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = T::ZERO;
            for k in 0..j {
                sum += l_data[i * n + k] * l_data[j * n + k];
            }

            if i == j {
                let val = a_data[i * n + i] - sum;
                if val <= T::ZERO || !val.is_finite() {
                    return Err(PipelineError::SingularMatrix);
                }
                l_data[i * n + j] = val.sqrt();
            } else {
                l_data[i * n + j] = (a_data[i * n + j] - sum) / l_data[j * n + j];
            }
        }
    }

    Ok(CholeskyDecomposition {
        l: Tensor::new(l_data, vec![n, n])?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_cholesky_reconstructs() {
        let a: Tensor<f64> =
            Tensor::new(vec![4.0, 12.0, -16.0, 12.0, 37.0, -43.0, -16.0, -43.0, 98.0], vec![3, 3])
                .unwrap();
        let l = cholesky(&a).unwrap().l;
        // Known factor: [[2,0,0],[6,1,0],[-8,5,3]]
        let expected = [2.0, 0.0, 0.0, 6.0, 1.0, 0.0, -8.0, 5.0, 3.0];
        for (got, want) in l.data().iter().zip(expected.iter()) {
            assert_abs_diff_eq!(*got, *want, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_cholesky_rejects_indefinite() {
        let a: Tensor<f64> = Tensor::new(vec![1.0, 2.0, 2.0, 1.0], vec![2, 2]).unwrap();
        assert_eq!(cholesky(&a).unwrap_err(), PipelineError::SingularMatrix);
    }

    #[test]
    fn test_cholesky_requires_square() {
        let a: Tensor<f64> = Tensor::new(vec![0.0; 6], vec![2, 3]).unwrap();
        assert!(matches!(cholesky(&a), Err(PipelineError::InvalidOperation(_))));
    }
}
