use credit_approval_core::{PipelineError, PipelineResult};
use credit_approval_data::TensorDataset;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

/// Split data into training and test sets.
///
/// Rows are shuffled with a seeded `StdRng`; the test set takes `ceil(n * test_ratio)` rows
/// and the training set the rest. Returns `(train, test)`.
pub fn train_test_split(
    data: &TensorDataset,
    test_ratio: f64,
    seed: Option<u64>,
) -> PipelineResult<(TensorDataset, TensorDataset)> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(PipelineError::InvalidParameter(format!(
            "test_ratio must be in (0, 1), got {}",
            test_ratio
        )));
    }
    let n = data.len();
    let test_size = (n as f64 * test_ratio).ceil() as usize;
    if test_size == 0 || test_size >= n {
        return Err(PipelineError::InvalidParameter(format!(
            "test_ratio {} on {} rows leaves an empty partition",
            test_ratio, n
        )));
    }
    let train_size = n - test_size;

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    indices.shuffle(&mut rng);

    debug!(train = train_size, test = test_size, "train/test split");
    Ok((
        data.subset(&indices[..train_size])?,
        data.subset(&indices[train_size..])?,
    ))
}
