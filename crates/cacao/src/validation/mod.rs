//! Model validation: fold construction, scoring, hyperparameter search,
//! nested cross-validation and the mean-guessing baseline.
//!
//! # Determinism
//!
//! Every randomized partition is drawn from an explicitly seeded
//! generator. Nested cross-validation seeds both the outer and the inner
//! partitioner of trial `t` with `t`, so repeated runs on the same inputs
//! produce bit-identical scores regardless of thread count.

mod baseline;
mod kfold;
mod metrics;
mod nested;
mod search;

pub use baseline::{guess_from_mean, BaselineConfig};
pub use kfold::{Fold, KFold};
pub use metrics::{Mae, Metric, MetricFn, MetricKind, Mse, Rmse, R2};
pub use nested::{
    EncodingStrategy, NestedCrossValidator, NestedCvConfig, NestedScores, OuterFoldResult,
};
pub use search::{cross_val_score, GridSearch, SearchResult};

use crate::config::ConfigError;
use crate::data::TableError;
use crate::encoding::EncodingError;
use crate::model::ModelError;

/// Errors raised by validation procedures.
///
/// All of them are precondition failures detected before any model is
/// fitted, except the wrapped model and encoding errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Features and targets disagree on the number of rows.
    #[error("feature matrix has {features} rows but target has {targets}")]
    ShapeMismatch { features: usize, targets: usize },

    /// Fold count is below 2 or exceeds the rows available.
    #[error("cannot split {n_samples} rows into {n_splits} folds")]
    InvalidFolds { n_splits: usize, n_samples: usize },

    /// No candidate configurations to search over.
    #[error("hyperparameter grid is empty")]
    EmptyGrid,

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
