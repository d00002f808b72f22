use credit_approval_core::{PipelineResult, Tensor};
use credit_approval_linear::LogisticRegression;
use credit_approval_metrics::accuracy;

/// Trait for supervised estimators.
pub trait Estimator {
    fn fit(&mut self, x: &Tensor<f64>, y: &Tensor<f64>) -> PipelineResult<()>;
    fn predict(&self, x: &Tensor<f64>) -> PipelineResult<Tensor<f64>>;

    /// Mean accuracy of `predict(x)` against `y`.
    fn score(&self, x: &Tensor<f64>, y: &Tensor<f64>) -> PipelineResult<f64> {
        accuracy(y, &self.predict(x)?)
    }
}

impl Estimator for LogisticRegression<f64> {
    fn fit(&mut self, x: &Tensor<f64>, y: &Tensor<f64>) -> PipelineResult<()> {
        LogisticRegression::fit(self, x, y)
    }

    fn predict(&self, x: &Tensor<f64>) -> PipelineResult<Tensor<f64>> {
        LogisticRegression::predict(self, x)
    }
}
