//! Regression models.
//!
//! - [`RegressionTree`]: CART regression tree in SoA layout
//! - [`RandomForest`]: bagged ensemble of regression trees
//! - [`RandomForestParams`]: forest hyperparameters (also the estimator)
//! - [`ForestGrid`]: candidate configurations for grid search
//!
//! Models consume feature-major matrices (`[n_features, n_samples]`), the
//! layout produced by [`EncodedMatrix`](crate::encoding::EncodedMatrix).

mod forest;
mod grid;
mod tree;

pub use forest::{MaxFeatures, RandomForest, RandomForestParams};
pub use grid::ForestGrid;
pub use tree::{NodeId, RegressionTree, TreeValidationError};

use ndarray::{Array1, ArrayView1, ArrayView2};

use crate::utils::Parallelism;

/// Errors raised when fitting or applying a model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("cannot fit on an empty training set")]
    EmptyTrainingSet,

    #[error("feature matrix has {features} samples but target has {targets}")]
    LengthMismatch { features: usize, targets: usize },

    #[error("model was fitted on {expected} features, got {got}")]
    FeatureCountMismatch { expected: usize, got: usize },

    #[error("target contains a non-finite value at sample {0}")]
    NonFiniteTarget(usize),
}

/// An estimator configuration that can be fitted to data.
///
/// Implementations must be deterministic: fitting the same configuration on
/// the same data yields the same model regardless of `parallelism`.
pub trait Regressor: Send + Sync {
    type Model: Predict + Send;

    /// Fit a model. `features` is `[n_features, n_samples]`.
    fn fit(
        &self,
        features: ArrayView2<'_, f64>,
        targets: ArrayView1<'_, f64>,
        parallelism: Parallelism,
    ) -> Result<Self::Model, ModelError>;
}

/// A fitted model.
pub trait Predict {
    /// Predict one value per sample of a `[n_features, n_samples]` matrix.
    fn predict(
        &self,
        features: ArrayView2<'_, f64>,
        parallelism: Parallelism,
    ) -> Result<Array1<f64>, ModelError>;
}

pub(crate) fn check_training_data(
    features: ArrayView2<'_, f64>,
    targets: ArrayView1<'_, f64>,
) -> Result<(), ModelError> {
    if features.ncols() != targets.len() {
        return Err(ModelError::LengthMismatch {
            features: features.ncols(),
            targets: targets.len(),
        });
    }
    if targets.is_empty() {
        return Err(ModelError::EmptyTrainingSet);
    }
    match targets.iter().position(|y| !y.is_finite()) {
        Some(i) => Err(ModelError::NonFiniteTarget(i)),
        None => Ok(()),
    }
}
