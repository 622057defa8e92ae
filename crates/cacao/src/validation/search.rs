//! Cross-validated hyperparameter search.
//!
//! Scoring one candidate on one fold is a pure function of the read-only
//! inputs, so every (candidate, fold) pair can be evaluated independently.
//! Results are merged afterwards by averaging per candidate.

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

use crate::model::{ModelError, Predict, Regressor};
use crate::utils::Parallelism;

use super::kfold::Fold;
use super::metrics::{Metric, MetricFn};
use super::ValidationError;

/// Fit `candidate` on the fold's training rows and score it on its test rows.
///
/// `features` is `[n_features, n_samples]`. The model is fitted
/// sequentially; parallelism belongs to the caller.
pub fn fold_score<R: Regressor>(
    features: ArrayView2<'_, f64>,
    targets: ArrayView1<'_, f64>,
    candidate: &R,
    fold: &Fold,
    metric: &Metric,
) -> Result<f64, ModelError> {
    let x_train = features.select(Axis(1), &fold.train);
    let y_train = targets.select(Axis(0), &fold.train);
    let x_test = features.select(Axis(1), &fold.test);
    let y_test = targets.select(Axis(0), &fold.test);

    let model = candidate.fit(x_train.view(), y_train.view(), Parallelism::Sequential)?;
    let pred = model.predict(x_test.view(), Parallelism::Sequential)?;
    Ok(metric.compute(pred.view(), y_test.view()))
}

/// Score one candidate on every fold.
pub fn cross_val_score<R: Regressor>(
    candidate: &R,
    features: ArrayView2<'_, f64>,
    targets: ArrayView1<'_, f64>,
    folds: &[Fold],
    metric: &Metric,
    parallelism: Parallelism,
) -> Result<Vec<f64>, ValidationError> {
    check_shape(features, targets)?;
    let scores = parallelism
        .maybe_par_try_map(folds, |fold| fold_score(features, targets, candidate, fold, metric))?;
    Ok(scores)
}

fn check_shape(features: ArrayView2<'_, f64>, targets: ArrayView1<'_, f64>) -> Result<(), ValidationError> {
    if features.ncols() != targets.len() {
        return Err(ValidationError::ShapeMismatch {
            features: features.ncols(),
            targets: targets.len(),
        });
    }
    Ok(())
}

/// Outcome of a grid search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Position of the selected candidate.
    pub best_index: usize,
    /// Mean fold score of the selected candidate.
    pub best_score: f64,
    /// Mean fold score per candidate.
    pub mean_scores: Vec<f64>,
    /// Raw scores, `[n_candidates, n_folds]`.
    pub fold_scores: Array2<f64>,
}

/// Exhaustive search over candidate configurations.
///
/// The best candidate has the best mean fold score under the metric's
/// direction. Ties go to the earliest candidate; a `NaN` mean never wins
/// against a finite one.
#[derive(Debug, Clone, Copy, Default)]
pub struct GridSearch {
    metric: Metric,
    parallelism: Parallelism,
}

impl GridSearch {
    pub fn new(metric: Metric) -> Self {
        Self {
            metric,
            parallelism: Parallelism::Sequential,
        }
    }

    /// Evaluate (candidate, fold) pairs with the given parallelism.
    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    #[inline]
    pub fn metric(&self) -> &Metric {
        &self.metric
    }

    /// Run the search.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::EmptyGrid`] if `candidates` is empty
    /// - [`ValidationError::ShapeMismatch`] if features and targets disagree
    /// - [`ValidationError::InvalidFolds`] if `folds` is empty
    /// - any model error raised while fitting
    pub fn run<R: Regressor>(
        &self,
        features: ArrayView2<'_, f64>,
        targets: ArrayView1<'_, f64>,
        candidates: &[R],
        folds: &[Fold],
    ) -> Result<SearchResult, ValidationError> {
        if candidates.is_empty() {
            return Err(ValidationError::EmptyGrid);
        }
        check_shape(features, targets)?;
        if folds.is_empty() {
            return Err(ValidationError::InvalidFolds {
                n_splits: 0,
                n_samples: targets.len(),
            });
        }

        let n_folds = folds.len();
        let metric = &self.metric;
        let scores = self.parallelism.maybe_par_try_map(0..candidates.len() * n_folds, |pair| {
            let (c, f) = (pair / n_folds, pair % n_folds);
            fold_score(features, targets, &candidates[c], &folds[f], metric)
        })?;

        let fold_scores = Array2::from_shape_vec((candidates.len(), n_folds), scores)
            .map_err(|_| ValidationError::ShapeMismatch {
                features: candidates.len() * n_folds,
                targets: n_folds,
            })?;
        let mean_scores: Vec<f64> = fold_scores
            .rows()
            .into_iter()
            .map(|row| row.sum() / n_folds as f64)
            .collect();

        let mut best_index = 0;
        for (i, &score) in mean_scores.iter().enumerate().skip(1) {
            let best = mean_scores[best_index];
            if (best.is_nan() && !score.is_nan()) || metric.is_better(score, best) {
                best_index = i;
            }
        }

        Ok(SearchResult {
            best_index,
            best_score: mean_scores[best_index],
            mean_scores,
            fold_scores,
        })
    }
}
