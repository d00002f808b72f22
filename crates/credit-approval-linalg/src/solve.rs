use credit_approval_core::{Float, PipelineError, PipelineResult, Tensor};

use crate::decomposition::cholesky;

/// Solve `A x = b` for symmetric positive-definite `A` via Cholesky factorisation.
pub fn solve_spd<T: Float>(a: &Tensor<T>, b: &Tensor<T>) -> PipelineResult<Tensor<T>> {
    let decomp = cholesky(a)?;
    let n = decomp.l.shape().dim(0)?;
    if b.ndim() != 1 || b.numel() != n {
        return Err(PipelineError::ShapeMismatch {
            expected: vec![n],
            got: b.shape_vec(),
        });
    }
    let l = decomp.l.data();
    let rhs = b.data();

    // Forward substitution: L * y = b
    let mut y = vec![T::ZERO; n];
    for i in 0..n {
        let mut sum = T::ZERO;
        for j in 0..i {
            sum += l[i * n + j] * y[j];
        }
        y[i] = (rhs[i] - sum) / l[i * n + i];
    }

    // Back substitution: Lᵀ * x = y
    let mut x = vec![T::ZERO; n];
    for i in (0..n).rev() {
        let mut sum = T::ZERO;
        for j in (i + 1)..n {
            sum += l[j * n + i] * x[j];
        }
        x[i] = (y[i] - sum) / l[i * n + i];
    }

    Tensor::new(x, vec![n])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_solve_spd() {
        // 2x + y = 5
        // x + 3y = 7
        let a: Tensor<f64> = Tensor::new(vec![2.0, 1.0, 1.0, 3.0], vec![2, 2]).unwrap();
        let b: Tensor<f64> = Tensor::from_slice(&[5.0, 7.0]);
        let x = solve_spd(&a, &b).unwrap();
        assert_abs_diff_eq!(x.data()[0], 1.6, epsilon = 1e-10);
        assert_abs_diff_eq!(x.data()[1], 1.8, epsilon = 1e-10);
    }

    #[test]
    fn test_solve_spd_rhs_length() {
        let a: Tensor<f64> = Tensor::new(vec![2.0, 1.0, 1.0, 3.0], vec![2, 2]).unwrap();
        let b: Tensor<f64> = Tensor::from_slice(&[5.0, 7.0, 1.0]);
        assert!(matches!(solve_spd(&a, &b), Err(PipelineError::ShapeMismatch { .. })));
    }
}
