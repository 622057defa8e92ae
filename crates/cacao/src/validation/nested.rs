//! Nested cross-validation.
//!
//! For each trial `t`, rows are split into `outer_folds` folds seeded by
//! `t`. For each outer fold, a grid search with `inner_folds` folds (also
//! seeded by `t`) runs on the outer-train rows only; the selected candidate
//! is refitted on the outer-train rows and scored on the held-out rows.
//! The outer scores estimate the performance of the whole tuning procedure.

use bon::Builder;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::data::{Table, TableError, Target};
use crate::encoding::{encode_aligned, one_hot_encode, EncodedMatrix, EncodingError};
use crate::model::{Predict, Regressor};
use crate::utils::{run_with_threads, Parallelism};

use super::kfold::{min_train_size, Fold, KFold};
use super::metrics::{Metric, MetricFn, MetricKind};
use super::search::GridSearch;
use super::ValidationError;

// =============================================================================
// Configuration
// =============================================================================

/// When categorical columns are one-hot encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingStrategy {
    /// Encode the full table once before any partitioning. Every split sees
    /// the same columns; categories from held-out rows are known to the
    /// encoder.
    #[default]
    Global,
    /// Encode each outer train/test split independently and align the test
    /// encoding to the training columns. Inner folds reuse the outer-train
    /// encoding.
    PerFold,
}

/// Nested cross-validation settings.
///
/// # Example
///
/// ```
/// use cacao::validation::{EncodingStrategy, NestedCvConfig};
///
/// let config = NestedCvConfig::builder()
///     .n_trials(2)
///     .inner_folds(3)
///     .outer_folds(3)
///     .encoding(EncodingStrategy::PerFold)
///     .build()
///     .unwrap();
/// assert_eq!(config.n_threads, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(derive(Clone, Debug), finish_fn(vis = "", name = __build_internal))]
#[serde(default)]
pub struct NestedCvConfig {
    /// Number of trials (independent outer partitions). Default: 10.
    #[builder(default = 10)]
    pub n_trials: usize,

    /// Folds of the inner hyperparameter search. Default: 4.
    #[builder(default = 4)]
    pub inner_folds: usize,

    /// Folds of the outer performance estimate. Default: 4.
    #[builder(default = 4)]
    pub outer_folds: usize,

    /// Scoring metric for both loops. Default: R².
    #[builder(default)]
    pub metric: MetricKind,

    #[builder(default)]
    pub encoding: EncodingStrategy,

    /// Thread count: 0 = auto, 1 = sequential, >1 = exact count.
    #[builder(default)]
    pub n_threads: usize,
}

impl<S: nested_cv_config_builder::IsComplete> NestedCvConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `n_trials == 0` or a fold count is below 2.
    pub fn build(self) -> Result<NestedCvConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl Default for NestedCvConfig {
    fn default() -> Self {
        Self {
            n_trials: 10,
            inner_folds: 4,
            outer_folds: 4,
            metric: MetricKind::default(),
            encoding: EncodingStrategy::default(),
            n_threads: 0,
        }
    }
}

impl NestedCvConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_trials == 0 {
            return Err(ConfigError::InvalidTrials);
        }
        for (field, value) in [("inner_folds", self.inner_folds), ("outer_folds", self.outer_folds)] {
            if value < 2 {
                return Err(ConfigError::InvalidFolds { field, value });
            }
        }
        Ok(())
    }
}

// =============================================================================
// Results
// =============================================================================

/// Outcome of one outer fold of one trial.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OuterFoldResult {
    pub trial: usize,
    pub fold: usize,
    /// Score of the refitted model on the outer-test rows.
    pub score: f64,
    /// Mean inner score of the selected candidate.
    pub inner_score: f64,
    /// Position of the selected candidate in the grid.
    pub selected: usize,
    pub n_train: usize,
    pub n_test: usize,
    /// Encoded feature count the model was fitted on.
    pub n_features: usize,
}

/// Nested scores indexed by (trial, outer fold).
#[derive(Debug, Clone, PartialEq)]
pub struct NestedScores {
    scores: Array2<f64>,
    folds: Vec<OuterFoldResult>,
    metric: MetricKind,
}

impl NestedScores {
    /// Scores as `[n_trials, n_outer_folds]`.
    #[inline]
    pub fn scores(&self) -> ArrayView2<'_, f64> {
        self.scores.view()
    }

    #[inline]
    pub fn n_trials(&self) -> usize {
        self.scores.nrows()
    }

    #[inline]
    pub fn n_outer_folds(&self) -> usize {
        self.scores.ncols()
    }

    /// Outer-fold scores of one trial.
    pub fn trial(&self, trial: usize) -> ArrayView1<'_, f64> {
        self.scores.row(trial)
    }

    /// All scores, trial by trial.
    pub fn flat(&self) -> Vec<f64> {
        self.scores.iter().copied().collect()
    }

    /// Per-fold details in (trial, fold) order.
    #[inline]
    pub fn folds(&self) -> &[OuterFoldResult] {
        &self.folds
    }

    /// Candidate selected for `(trial, fold)`.
    pub fn selected(&self, trial: usize, fold: usize) -> Option<usize> {
        self.folds.get(trial * self.n_outer_folds() + fold).map(|r| r.selected)
    }

    #[inline]
    pub fn metric(&self) -> MetricKind {
        self.metric
    }
}

// =============================================================================
// NestedCrossValidator
// =============================================================================

enum FeatureSource<'a> {
    Encoded(&'a EncodedMatrix),
    PerFold(&'a Table),
}

impl FeatureSource<'_> {
    fn split(&self, fold: &Fold) -> Result<(EncodedMatrix, EncodedMatrix), EncodingError> {
        match self {
            Self::Encoded(m) => Ok((m.select_rows(&fold.train), m.select_rows(&fold.test))),
            Self::PerFold(t) => encode_aligned(&t.select_rows(&fold.train), &t.select_rows(&fold.test)),
        }
    }
}

/// Runs nested cross-validation over a candidate grid.
#[derive(Debug, Clone, Default)]
pub struct NestedCrossValidator {
    config: NestedCvConfig,
}

impl NestedCrossValidator {
    pub fn new(config: NestedCvConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &NestedCvConfig {
        &self.config
    }

    /// Evaluate `candidates` on a feature table and its target.
    ///
    /// Categorical columns are one-hot encoded according to
    /// [`NestedCvConfig::encoding`].
    ///
    /// # Errors
    ///
    /// Fails before any fold is built if the grid is empty, the table and
    /// target disagree on rows, or a fold count exceeds the rows available.
    pub fn run<R: Regressor>(
        &self,
        features: &Table,
        target: &Target,
        candidates: &[R],
    ) -> Result<NestedScores, ValidationError> {
        self.check_preconditions(features.n_rows(), target.len(), candidates.len())?;
        if features.index() != target.index() {
            return Err(TableError::IndexMismatch.into());
        }

        match self.config.encoding {
            EncodingStrategy::Global => {
                let encoded = one_hot_encode(features)?;
                tracing::debug!(n_features = encoded.n_features(), "encoded features globally");
                self.run_source(FeatureSource::Encoded(&encoded), target.values(), candidates)
            }
            EncodingStrategy::PerFold => {
                self.run_source(FeatureSource::PerFold(features), target.values(), candidates)
            }
        }
    }

    /// Evaluate `candidates` on an already encoded matrix.
    ///
    /// The encoding strategy is ignored: the matrix is partitioned as is.
    pub fn run_encoded<R: Regressor>(
        &self,
        features: &EncodedMatrix,
        targets: ArrayView1<'_, f64>,
        candidates: &[R],
    ) -> Result<NestedScores, ValidationError> {
        self.check_preconditions(features.n_samples(), targets.len(), candidates.len())?;
        self.run_source(FeatureSource::Encoded(features), targets, candidates)
    }

    fn check_preconditions(
        &self,
        n_rows: usize,
        n_targets: usize,
        n_candidates: usize,
    ) -> Result<(), ValidationError> {
        self.config.validate()?;
        if n_candidates == 0 {
            return Err(ValidationError::EmptyGrid);
        }
        if n_rows != n_targets {
            return Err(ValidationError::ShapeMismatch {
                features: n_rows,
                targets: n_targets,
            });
        }
        let outer = self.config.outer_folds;
        if outer > n_rows {
            return Err(ValidationError::InvalidFolds {
                n_splits: outer,
                n_samples: n_rows,
            });
        }
        let min_train = min_train_size(n_rows, outer);
        if self.config.inner_folds > min_train {
            return Err(ValidationError::InvalidFolds {
                n_splits: self.config.inner_folds,
                n_samples: min_train,
            });
        }
        Ok(())
    }

    fn run_source<R: Regressor>(
        &self,
        source: FeatureSource<'_>,
        targets: ArrayView1<'_, f64>,
        candidates: &[R],
    ) -> Result<NestedScores, ValidationError> {
        run_with_threads(self.config.n_threads, |parallelism| {
            self.run_trials(&source, targets, candidates, parallelism)
        })
    }

    fn run_trials<R: Regressor>(
        &self,
        source: &FeatureSource<'_>,
        targets: ArrayView1<'_, f64>,
        candidates: &[R],
        parallelism: Parallelism,
    ) -> Result<NestedScores, ValidationError> {
        let NestedCvConfig {
            n_trials,
            inner_folds,
            outer_folds,
            ..
        } = self.config;
        let metric = Metric::from(self.config.metric);
        let search = GridSearch::new(metric).with_parallelism(parallelism);

        let mut scores = Array2::<f64>::zeros((n_trials, outer_folds));
        let mut folds = Vec::with_capacity(n_trials * outer_folds);

        for trial in 0..n_trials {
            let seed = trial as u64;
            let outer = KFold::new(outer_folds, seed).split(targets.len())?;

            for (f, fold) in outer.iter().enumerate() {
                let (x_train, x_test) = source.split(fold)?;
                let y_train: Array1<f64> = targets.select(Axis(0), &fold.train);
                let y_test: Array1<f64> = targets.select(Axis(0), &fold.test);

                let inner = KFold::new(inner_folds, seed).split(y_train.len())?;
                let found = search.run(x_train.features(), y_train.view(), candidates, &inner)?;

                let best = &candidates[found.best_index];
                let model = best.fit(x_train.features(), y_train.view(), parallelism)?;
                let pred = model.predict(x_test.features(), parallelism)?;
                let score = metric.compute(pred.view(), y_test.view());

                tracing::debug!(
                    trial,
                    fold = f,
                    selected = found.best_index,
                    inner_score = found.best_score,
                    score,
                    "outer fold scored"
                );

                scores[[trial, f]] = score;
                folds.push(OuterFoldResult {
                    trial,
                    fold: f,
                    score,
                    inner_score: found.best_score,
                    selected: found.best_index,
                    n_train: fold.train.len(),
                    n_test: fold.test.len(),
                    n_features: x_train.n_features(),
                });
            }

            let row = scores.row(trial);
            tracing::info!(
                trial,
                metric = metric.name(),
                mean = row.sum() / outer_folds as f64,
                "nested trial complete"
            );
        }

        Ok(NestedScores {
            scores,
            folds,
            metric: self.config.metric,
        })
    }
}
