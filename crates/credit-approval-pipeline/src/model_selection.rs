use credit_approval_core::{PipelineError, PipelineResult, Tensor};
use credit_approval_data::TensorDataset;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info};

use crate::estimator::Estimator;

/// A single train/validation split.
#[derive(Debug, Clone)]
pub struct CVSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
    pub fold_idx: usize,
}

/// K-fold splitter that keeps each class's share roughly equal across folds.
///
/// Samples of each class (ascending label order) are optionally shuffled with a seeded
/// `StdRng` and then dealt round-robin into the folds.
#[derive(Debug, Clone)]
pub struct StratifiedKFold {
    pub n_splits: usize,
    pub shuffle: bool,
    pub seed: Option<u64>,
}

impl StratifiedKFold {
    pub fn new(n_splits: usize) -> Self {
        StratifiedKFold {
            n_splits,
            shuffle: false,
            seed: None,
        }
    }

    /// Shuffle within each class using `seed` before assigning folds.
    pub fn with_shuffle(mut self, seed: u64) -> Self {
        self.shuffle = true;
        self.seed = Some(seed);
        self
    }

    pub fn split(&self, labels: &Tensor<f64>) -> PipelineResult<Vec<CVSplit>> {
        let n_samples = labels.numel();
        if self.n_splits < 2 {
            return Err(PipelineError::InvalidParameter(
                "n_splits must be at least 2".to_string(),
            ));
        }
        if n_samples < self.n_splits {
            return Err(PipelineError::InvalidParameter(format!(
                "n_samples ({}) must be >= n_splits ({})",
                n_samples, self.n_splits
            )));
        }

        let mut class_indices: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (idx, &val) in labels.data().iter().enumerate() {
            class_indices.entry(val.round() as i64).or_default().push(idx);
        }

        if self.shuffle {
            let mut rng = match self.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            for indices in class_indices.values_mut() {
                indices.shuffle(&mut rng);
            }
        }

        // Continue the round-robin across classes so small classes don't all land in fold 0.
        let mut folds: Vec<Vec<usize>> = vec![Vec::new(); self.n_splits];
        let mut next = 0;
        for indices in class_indices.values() {
            for &idx in indices {
                folds[next % self.n_splits].push(idx);
                next += 1;
            }
        }

        let splits = (0..self.n_splits)
            .map(|fold_idx| {
                let mut test_indices = folds[fold_idx].clone();
                test_indices.sort_unstable();
                let mut train_indices: Vec<usize> = folds
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != fold_idx)
                    .flat_map(|(_, f)| f.iter().copied())
                    .collect();
                train_indices.sort_unstable();
                CVSplit {
                    train_indices,
                    test_indices,
                    fold_idx,
                }
            })
            .collect();
        Ok(splits)
    }
}

/// Cross-validation results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CVResults {
    /// Scores for each fold
    pub scores: Vec<f64>,
    pub mean_score: f64,
    pub std_score: f64,
}

impl CVResults {
    pub fn from_scores(scores: Vec<f64>) -> Self {
        let n = scores.len() as f64;
        let mean_score = scores.iter().sum::<f64>() / n;
        let variance = scores.iter().map(|s| (s - mean_score).powi(2)).sum::<f64>() / n;
        CVResults {
            scores,
            mean_score,
            std_score: variance.sqrt(),
        }
    }
}

/// Fit a fresh estimator from `build` on every training fold and score it on the held-out fold.
pub fn cross_val_score<E, F>(
    build: F,
    data: &TensorDataset,
    cv: &StratifiedKFold,
) -> PipelineResult<CVResults>
where
    E: Estimator,
    F: Fn() -> E,
{
    let splits = cv.split(&data.labels)?;
    let mut scores = Vec::with_capacity(splits.len());
    for split in &splits {
        let train = data.subset(&split.train_indices)?;
        let test = data.subset(&split.test_indices)?;
        let mut estimator = build();
        estimator.fit(&train.features, &train.labels)?;
        scores.push(estimator.score(&test.features, &test.labels)?);
    }
    Ok(CVResults::from_scores(scores))
}

/// Hyperparameters searched for the logistic-regression classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogisticParams {
    pub max_iter: usize,
    pub tol: f64,
}

impl fmt::Display for LogisticParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{max_iter: {}, tol: {}}}", self.max_iter, self.tol)
    }
}

/// Value lists for each searched hyperparameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterGrid {
    pub tol: Vec<f64>,
    pub max_iter: Vec<usize>,
}

impl ParameterGrid {
    /// Every combination, `max_iter` varying slowest and `tol` fastest.
    pub fn candidates(&self) -> Vec<LogisticParams> {
        self.max_iter
            .iter()
            .flat_map(|&max_iter| self.tol.iter().map(move |&tol| LogisticParams { max_iter, tol }))
            .collect()
    }
}

impl fmt::Display for ParameterGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{tol: {:?}, max_iter: {:?}}}", self.tol, self.max_iter)
    }
}

/// Cross-validated score of one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult<P> {
    pub params: P,
    pub cv: CVResults,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSearchResult<P> {
    pub best_index: usize,
    pub best_params: P,
    pub best_score: f64,
    pub cv_results: Vec<CandidateResult<P>>,
}

/// Exhaustive search over candidate hyperparameters, scored by stratified k-fold accuracy.
///
/// Candidates are evaluated in parallel; the result does not depend on scheduling. The best
/// candidate has the highest mean score, ties going to the earliest candidate.
pub struct GridSearchCV<P> {
    pub candidates: Vec<P>,
    pub cv: StratifiedKFold,
}

impl<P> GridSearchCV<P>
where
    P: Clone + fmt::Display + Send + Sync,
{
    pub fn new(candidates: Vec<P>, cv: StratifiedKFold) -> Self {
        GridSearchCV { candidates, cv }
    }

    pub fn fit<E, F>(&self, data: &TensorDataset, build: F) -> PipelineResult<GridSearchResult<P>>
    where
        E: Estimator,
        F: Fn(&P) -> E + Sync,
    {
        if self.candidates.is_empty() {
            return Err(PipelineError::InvalidParameter("empty parameter grid".into()));
        }
        info!(
            candidates = self.candidates.len(),
            folds = self.cv.n_splits,
            "starting grid search"
        );

        let cv_results: Vec<CandidateResult<P>> = self
            .candidates
            .par_iter()
            .map(|params| {
                let cv = cross_val_score(|| build(params), data, &self.cv)?;
                debug!(params = %params, mean = cv.mean_score, std = cv.std_score, "candidate scored");
                Ok(CandidateResult {
                    params: params.clone(),
                    cv,
                })
            })
            .collect::<PipelineResult<Vec<_>>>()?;

        let mut best_index = 0;
        for (i, r) in cv_results.iter().enumerate() {
            if r.cv.mean_score > cv_results[best_index].cv.mean_score {
                best_index = i;
            }
        }
        let best = &cv_results[best_index];
        info!(params = %best.params, score = best.cv.mean_score, "grid search finished");

        Ok(GridSearchResult {
            best_index,
            best_params: best.params.clone(),
            best_score: best.cv.mean_score,
            cv_results,
        })
    }
}
