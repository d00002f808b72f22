use credit_approval_core::{Float, PipelineError, PipelineResult, Tensor};
use credit_approval_linalg::solve_spd;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Optimisation method used by [`LogisticRegression::fit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Solver {
    /// Newton–Raphson with step halving; the Hessian system is solved by Cholesky.
    #[default]
    Newton,
    /// Plain batch gradient descent with a fixed learning rate.
    GradientDescent,
}

/// Binary logistic regression with an L2 penalty on the weights (not the intercept).
///
/// Minimises `mean(log_loss) + ‖w‖² / (2·n·c)`, the per-sample form of
/// `c·Σ log_loss + ‖w‖²/2`. Fitting stops once the largest gradient component is at most
/// `tol`, or after `max_iter` iterations.
#[derive(Debug, Clone)]
pub struct LogisticRegression<T: Float> {
    pub weights: Option<Tensor<T>>,
    pub bias: Option<T>,
    /// Inverse regularisation strength.
    pub c: T,
    pub tol: T,
    pub max_iter: usize,
    pub solver: Solver,
    pub learning_rate: T,
    /// Iterations performed by the last `fit`.
    pub n_iter: usize,
    pub converged: bool,
}

impl<T: Float> LogisticRegression<T> {
    pub fn new(c: T, tol: T, max_iter: usize) -> Self {
        LogisticRegression {
            weights: None,
            bias: None,
            c,
            tol,
            max_iter,
            solver: Solver::Newton,
            learning_rate: T::from_f64(0.5),
            n_iter: 0,
            converged: false,
        }
    }

    pub fn with_solver(mut self, solver: Solver) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: T) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    fn sigmoid_val(z: T) -> T {
        if z >= T::ZERO {
            T::ONE / (T::ONE + (-z).exp())
        } else {
            let e = z.exp();
            e / (T::ONE + e)
        }
    }

    /// `ln(1 + e^z)` without overflow.
    fn softplus(z: T) -> T {
        if z > T::ZERO {
            z + (T::ONE + (-z).exp()).ln()
        } else {
            (T::ONE + z.exp()).ln()
        }
    }

    fn validate(&self, x: &Tensor<T>, y: &Tensor<T>) -> PipelineResult<(usize, usize)> {
        if self.c <= T::ZERO {
            return Err(PipelineError::InvalidParameter(format!("c must be positive, got {}", self.c)));
        }
        if self.tol < T::ZERO {
            return Err(PipelineError::InvalidParameter(format!("tol must be non-negative, got {}", self.tol)));
        }
        if self.solver == Solver::GradientDescent && !(self.learning_rate > T::ZERO) {
            return Err(PipelineError::InvalidParameter(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if x.ndim() != 2 {
            return Err(PipelineError::InvalidOperation("fit requires 2D features".into()));
        }
        let n = x.shape().dim(0)?;
        let p = x.shape().dim(1)?;
        if n == 0 {
            return Err(PipelineError::InvalidOperation("cannot fit on zero rows".into()));
        }
        if y.numel() != n {
            return Err(PipelineError::ShapeMismatch {
                expected: vec![n],
                got: y.shape_vec(),
            });
        }
        if let Some(bad) = y.data().iter().find(|&&v| v != T::ZERO && v != T::ONE) {
            return Err(PipelineError::InvalidParameter(format!(
                "labels must be 0 or 1, found {}",
                bad
            )));
        }
        Ok((n, p))
    }

    fn linear_term(w: &[T], b: T, row: &[T]) -> T {
        row.iter().zip(w).fold(b, |acc, (&xi, &wi)| acc + xi * wi)
    }

    fn objective(&self, x: &Tensor<T>, y: &[T], w: &[T], b: T) -> PipelineResult<T> {
        let n = y.len();
        let mut loss = T::ZERO;
        for (i, &yi) in y.iter().enumerate() {
            let z = Self::linear_term(w, b, x.row_slice(i)?);
            loss += Self::softplus(z) - yi * z;
        }
        let penalty: T = w.iter().map(|&wi| wi * wi).sum();
        let n_t = T::from_usize(n);
        Ok(loss / n_t + penalty / (T::from_f64(2.0) * n_t * self.c))
    }

    /// Gradient over `[w.., b]`, and the residuals `p - y` needed for the Hessian.
    fn gradient(&self, x: &Tensor<T>, y: &[T], w: &[T], b: T) -> PipelineResult<(Vec<T>, Vec<T>)> {
        let n = y.len();
        let p = w.len();
        let n_t = T::from_usize(n);
        let mut grad = vec![T::ZERO; p + 1];
        let mut proba = Vec::with_capacity(n);
        for (i, &yi) in y.iter().enumerate() {
            let row = x.row_slice(i)?;
            let a = Self::sigmoid_val(Self::linear_term(w, b, row));
            let error = a - yi;
            for j in 0..p {
                grad[j] += error * row[j];
            }
            grad[p] += error;
            proba.push(a);
        }
        for j in 0..p {
            grad[j] = grad[j] / n_t + w[j] / (n_t * self.c);
        }
        grad[p] = grad[p] / n_t;
        Ok((grad, proba))
    }

    fn newton_direction(
        &self,
        x: &Tensor<T>,
        proba: &[T],
        grad: &[T],
    ) -> PipelineResult<Vec<T>> {
        let n = proba.len();
        let dim = grad.len();
        let p = dim - 1;
        let n_t = T::from_usize(n);
        let mut hess = vec![T::ZERO; dim * dim];
        let mut xi = vec![T::ONE; dim];
        for (i, &a) in proba.iter().enumerate() {
            xi[..p].copy_from_slice(x.row_slice(i)?);
            let s = a * (T::ONE - a);
            for r in 0..dim {
                let sr = s * xi[r];
                for c in 0..=r {
                    hess[r * dim + c] += sr * xi[c];
                }
            }
        }
        let jitter = T::from_f64(1e-10);
        for r in 0..dim {
            for c in 0..=r {
                let v = hess[r * dim + c] / n_t;
                hess[r * dim + c] = v;
                hess[c * dim + r] = v;
            }
            hess[r * dim + r] += jitter;
            if r < p {
                hess[r * dim + r] += T::ONE / (n_t * self.c);
            }
        }
        let h = Tensor::new(hess, vec![dim, dim])?;
        let g = Tensor::from_slice(grad);
        Ok(solve_spd(&h, &g)?.into_data())
    }

    pub fn fit(&mut self, x: &Tensor<T>, y: &Tensor<T>) -> PipelineResult<()> {
        let (_n, p) = self.validate(x, y)?;
        let y = y.data();

        let mut w = vec![T::ZERO; p];
        let mut b = T::ZERO;
        let mut n_iter = 0;
        let mut converged = false;

        loop {
            let (grad, proba) = self.gradient(x, y, &w, b)?;
            let max_grad = grad.iter().fold(T::ZERO, |m, g| m.max(g.abs()));
            if max_grad <= self.tol {
                converged = true;
                break;
            }
            if n_iter >= self.max_iter {
                break;
            }

            match self.solver {
                Solver::GradientDescent => {
                    for j in 0..p {
                        w[j] -= self.learning_rate * grad[j];
                    }
                    b -= self.learning_rate * grad[p];
                }
                Solver::Newton => {
                    let direction = self.newton_direction(x, &proba, &grad)?;
                    let current = self.objective(x, y, &w, b)?;
                    let mut step = T::ONE;
                    for _ in 0..30 {
                        let cand_w: Vec<T> =
                            w.iter().zip(&direction).map(|(&wi, &d)| wi - step * d).collect();
                        let cand_b = b - step * direction[p];
                        if self.objective(x, y, &cand_w, cand_b)? <= current {
                            w = cand_w;
                            b = cand_b;
                            break;
                        }
                        step = step * T::HALF;
                    }
                }
            }
            n_iter += 1;
        }

        if converged {
            debug!(n_iter, solver = ?self.solver, "logistic regression converged");
        } else {
            warn!(
                max_iter = self.max_iter,
                tol = %self.tol,
                "logistic regression did not converge; keeping last iterate"
            );
        }

        self.weights = Some(Tensor::new(w, vec![p])?);
        self.bias = Some(b);
        self.n_iter = n_iter;
        self.converged = converged;
        Ok(())
    }

    /// Predict probabilities of class 1.
    pub fn predict_proba(&self, x: &Tensor<T>) -> PipelineResult<Tensor<T>> {
        let w = self
            .weights
            .as_ref()
            .ok_or(PipelineError::NotFitted("LogisticRegression"))?;
        let n = x.shape().dim(0)?;
        let p = x.shape().dim(1)?;
        if p != w.numel() {
            return Err(PipelineError::ShapeMismatch {
                expected: vec![n, w.numel()],
                got: x.shape_vec(),
            });
        }
        let b = self.bias.unwrap_or(T::ZERO);

        let mut proba = Vec::with_capacity(n);
        for i in 0..n {
            proba.push(Self::sigmoid_val(Self::linear_term(w.data(), b, x.row_slice(i)?)));
        }

        Tensor::new(proba, vec![n])
    }

    /// Predict class labels (threshold = 0.5).
    pub fn predict(&self, x: &Tensor<T>) -> PipelineResult<Tensor<T>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.apply(|p| if p > T::HALF { T::ONE } else { T::ZERO }))
    }
}

impl<T: Float> Default for LogisticRegression<T> {
    /// `c = 1.0`, `tol = 1e-4`, `max_iter = 100`, Newton solver.
    fn default() -> Self {
        Self::new(T::ONE, T::from_f64(1e-4), 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn separable() -> (Tensor<f64>, Tensor<f64>) {
        let x = Tensor::from_vec2d(&[
            vec![0.0, 0.0],
            vec![0.5, 0.5],
            vec![1.0, 1.0],
            vec![5.0, 5.0],
            vec![5.5, 5.5],
            vec![6.0, 6.0],
        ])
        .unwrap();
        let y = Tensor::from_slice(&[0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        (x, y)
    }

    #[test]
    fn test_logistic_regression_newton() {
        let (x, y) = separable();
        let mut model = LogisticRegression::default();
        model.fit(&x, &y).unwrap();
        assert!(model.converged);

        let pred = model.predict(&x).unwrap();
        assert_eq!(pred.data(), y.data());
    }

    #[test]
    fn test_logistic_regression_gradient_descent() {
        let (x, y) = separable();
        let mut model = LogisticRegression::new(1e6, 1e-6, 1000)
            .with_solver(Solver::GradientDescent)
            .with_learning_rate(0.1);
        model.fit(&x, &y).unwrap();

        let pred = model.predict(&x).unwrap();
        for i in 0..3 {
            assert_eq!(pred.data()[i], 0.0, "Expected 0 at {}", i);
        }
        for i in 3..6 {
            assert_eq!(pred.data()[i], 1.0, "Expected 1 at {}", i);
        }
    }

    #[test]
    fn test_solvers_agree() {
        let x = Tensor::from_vec2d(&[
            vec![0.1, 0.9],
            vec![0.4, 0.2],
            vec![0.8, 0.7],
            vec![0.3, 0.5],
            vec![0.9, 0.1],
            vec![0.6, 0.6],
        ])
        .unwrap();
        let y = Tensor::from_slice(&[0.0, 0.0, 1.0, 0.0, 1.0, 1.0]);

        let mut newton = LogisticRegression::new(1.0, 1e-10, 100);
        newton.fit(&x, &y).unwrap();
        let mut gd = LogisticRegression::new(1.0, 1e-10, 200_000)
            .with_solver(Solver::GradientDescent)
            .with_learning_rate(1.0);
        gd.fit(&x, &y).unwrap();

        let wn = newton.weights.as_ref().unwrap().data();
        let wg = gd.weights.as_ref().unwrap().data();
        for (a, b) in wn.iter().zip(wg) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-4);
        }
        assert_abs_diff_eq!(newton.bias.unwrap(), gd.bias.unwrap(), epsilon = 1e-4);
    }

    #[test]
    fn test_max_iter_bounds_iterations() {
        let (x, y) = separable();
        let mut model = LogisticRegression::new(1.0, 0.0, 3);
        model.fit(&x, &y).unwrap();
        assert_eq!(model.n_iter, 3);
        assert!(!model.converged);
        assert!(model.weights.is_some());
    }

    #[test]
    fn test_probabilities_are_in_unit_interval() {
        let (x, y) = separable();
        let mut model = LogisticRegression::default();
        model.fit(&x, &y).unwrap();
        let proba = model.predict_proba(&x).unwrap();
        assert!(proba.data().iter().all(|&p| p > 0.0 && p < 1.0));
    }

    #[test]
    fn test_gradient_descent_needs_positive_learning_rate() {
        let (x, y) = separable();
        let mut model = LogisticRegression::new(1.0, 1e-4, 10)
            .with_solver(Solver::GradientDescent)
            .with_learning_rate(0.0);
        assert!(matches!(
            model.fit(&x, &y),
            Err(PipelineError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_solver_names() {
        assert_eq!(Solver::default(), Solver::Newton);
        assert_eq!(serde_json::to_string(&Solver::GradientDescent).unwrap(), "\"gradient_descent\"");
        let solver: Solver = serde_json::from_str("\"newton\"").unwrap();
        assert_eq!(solver, Solver::Newton);
    }

    #[test]
    fn test_rejects_non_binary_labels() {
        let x = Tensor::from_vec2d(&[vec![0.0], vec![1.0]]).unwrap();
        let y = Tensor::from_slice(&[0.0, 2.0]);
        let mut model: LogisticRegression<f64> = LogisticRegression::default();
        assert!(matches!(
            model.fit(&x, &y),
            Err(PipelineError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_predict_before_fit() {
        let model: LogisticRegression<f64> = LogisticRegression::default();
        let x = Tensor::from_vec2d(&[vec![0.0]]).unwrap();
        assert_eq!(
            model.predict(&x).unwrap_err(),
            PipelineError::NotFitted("LogisticRegression")
        );
    }
}
