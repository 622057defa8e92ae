//! Evaluation configuration and parameter validation errors.
//!
//! [`EvaluationConfig`] bundles every knob of an evaluation run and is read
//! from JSON. Missing sections and fields take their defaults:
//!
//! ```json
//! {
//!   "baseline": { "n_repeats": 10, "n_folds": 5 },
//!   "nested": { "n_trials": 10, "inner_folds": 4, "outer_folds": 4, "metric": "r2" },
//!   "grid": { "n_trees": [50, 100], "max_depth": [null, 4, 8] },
//!   "cleaning": { "rare_origin_threshold": null }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::CleaningConfig;
use crate::model::ForestGrid;
use crate::validation::{BaselineConfig, NestedCvConfig};

// =============================================================================
// ConfigError
// =============================================================================

/// Errors that can occur during parameter validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Number of trees must be at least 1.
    InvalidNTrees,
    /// Maximum depth must be at least 1 when set.
    InvalidMaxDepth,
    /// Sample-count limit below its minimum.
    InvalidMinSamples { field: &'static str, value: usize },
    /// Feature fraction outside (0, 1].
    InvalidMaxFeatures(f64),
    /// Grid has an empty axis.
    EmptyGrid,
    /// Number of nested trials must be at least 1.
    InvalidTrials,
    /// Number of baseline repetitions must be at least 1.
    InvalidRepeats,
    /// Fold count below 2.
    InvalidFolds { field: &'static str, value: usize },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNTrees => write!(f, "n_trees must be at least 1"),
            Self::InvalidMaxDepth => write!(f, "max_depth must be at least 1"),
            Self::InvalidMinSamples { field, value } => {
                let min = if *field == "min_samples_split" { 2 } else { 1 };
                write!(f, "{} must be at least {}, got {}", field, min, value)
            }
            Self::InvalidMaxFeatures(v) => {
                write!(f, "max_features fraction must be in (0, 1], got {}", v)
            }
            Self::EmptyGrid => write!(f, "hyperparameter grid has an empty axis"),
            Self::InvalidTrials => write!(f, "n_trials must be at least 1"),
            Self::InvalidRepeats => write!(f, "n_repeats must be at least 1"),
            Self::InvalidFolds { field, value } => {
                write!(f, "{} must be at least 2, got {}", field, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// =============================================================================
// EvaluationConfig
// =============================================================================

/// Errors reading an [`EvaluationConfig`] file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration JSON")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// Settings for a full evaluation run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    pub baseline: BaselineConfig,
    pub nested: NestedCvConfig,
    pub grid: ForestGrid,
    pub cleaning: CleaningConfig,
}

impl EvaluationConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigFileError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigFileError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.baseline.validate()?;
        self.nested.validate()?;
        self.grid.candidates()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{EncodingStrategy, MetricKind};

    #[test]
    fn empty_document_is_default() {
        assert_eq!(EvaluationConfig::from_json("{}").unwrap(), EvaluationConfig::default());
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config = EvaluationConfig::from_json(
            r#"{"nested": {"n_trials": 3, "metric": "mse", "encoding": "per_fold"}, "baseline": {"n_folds": 4}}"#,
        )
        .unwrap();
        assert_eq!(config.nested.n_trials, 3);
        assert_eq!(config.nested.inner_folds, 4);
        assert_eq!(config.nested.metric, MetricKind::Mse);
        assert_eq!(config.nested.encoding, EncodingStrategy::PerFold);
        assert_eq!(config.baseline.n_folds, 4);
        assert_eq!(config.baseline.n_repeats, 10);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = EvaluationConfig::from_json(r#"{"nested": {"outer_folds": 1}}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigFileError::Invalid(ConfigError::InvalidFolds { field: "outer_folds", value: 1 })
        ));
        assert!(matches!(
            EvaluationConfig::from_json("{not json").unwrap_err(),
            ConfigFileError::Json(_)
        ));
    }

    #[test]
    fn display_messages() {
        assert_eq!(ConfigError::InvalidNTrees.to_string(), "n_trees must be at least 1");
        assert_eq!(
            ConfigError::InvalidMinSamples { field: "min_samples_split", value: 1 }.to_string(),
            "min_samples_split must be at least 2, got 1"
        );
    }
}
