//! cacao: chocolate-bar rating analysis.
//!
//! Loads the Flavors of Cacao review table, normalizes it, and estimates how
//! well a random forest predicts expert ratings using nested cross-validation
//! against a mean-guessing baseline.
//!
//! # Key Types
//!
//! - [`Table`] / [`Target`] - Review data and the rating vector
//! - [`EncodedMatrix`] - One-hot encoded, feature-major numeric features
//! - [`RandomForestParams`] / [`RandomForest`] - Estimator and fitted model
//! - [`NestedCrossValidator`] / [`NestedCvConfig`] - Performance estimation
//! - [`EvaluationConfig`] / [`EvaluationReport`] - Run settings and output
//!
//! # Pipeline
//!
//! ```
//! use cacao::data::{split_features_labels, columns::RATING};
//! use cacao::model::{MaxFeatures, RandomForestParams};
//! use cacao::validation::{guess_from_mean, BaselineConfig, NestedCrossValidator, NestedCvConfig};
//!
//! let table = cacao::testing::synthetic_reviews(60, 0);
//! let (features, target) = split_features_labels(&table, RATING).unwrap();
//!
//! let baseline = guess_from_mean(target.values(), &BaselineConfig::default()).unwrap();
//! assert_eq!(baseline.len(), 50);
//!
//! let grid = vec![
//!     RandomForestParams::builder().n_trees(5).max_depth(3).build().unwrap(),
//!     RandomForestParams::builder().n_trees(5).max_features(MaxFeatures::Sqrt).build().unwrap(),
//! ];
//! let config = NestedCvConfig::builder().n_trials(1).inner_folds(2).outer_folds(3).build().unwrap();
//! let scores = NestedCrossValidator::new(config).run(&features, &target, &grid).unwrap();
//! assert_eq!(scores.scores().dim(), (1, 3));
//! ```

pub mod config;
pub mod data;
pub mod encoding;
pub mod model;
pub mod report;
pub mod testing;
pub mod utils;
pub mod validation;

// =============================================================================
// Convenience Re-exports
// =============================================================================

pub use config::{ConfigError, EvaluationConfig};

pub use data::{Column, Table, Target};

pub use encoding::EncodedMatrix;

pub use model::{Predict, RandomForest, RandomForestParams, Regressor};

pub use report::EvaluationReport;

pub use validation::{NestedCrossValidator, NestedCvConfig, ValidationError};

pub use utils::{Parallelism, run_with_threads};
