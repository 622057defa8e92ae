//! Hyperparameter grid for random forest search.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

use super::{MaxFeatures, RandomForestParams};

/// Cartesian grid over `n_trees × max_depth × max_features`.
///
/// Every other parameter is taken from `base`. Candidates are enumerated
/// with `n_trees` varying slowest and `max_features` fastest, so the order
/// (and therefore tie-breaking in grid search) is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestGrid {
    pub n_trees: Vec<u32>,
    pub max_depth: Vec<Option<u32>>,
    pub max_features: Vec<MaxFeatures>,
    pub base: RandomForestParams,
}

impl Default for ForestGrid {
    fn default() -> Self {
        Self {
            n_trees: vec![50, 100],
            max_depth: vec![None, Some(4), Some(8)],
            max_features: vec![MaxFeatures::All, MaxFeatures::Sqrt],
            base: RandomForestParams::default(),
        }
    }
}

impl ForestGrid {
    /// Number of candidate configurations.
    pub fn len(&self) -> usize {
        self.n_trees.len() * self.max_depth.len() * self.max_features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Enumerate the candidates, validating each.
    ///
    /// # Errors
    ///
    /// [`ConfigError::EmptyGrid`] if any axis is empty, or the first
    /// validation error of an invalid candidate.
    pub fn candidates(&self) -> Result<Vec<RandomForestParams>, ConfigError> {
        if self.is_empty() {
            return Err(ConfigError::EmptyGrid);
        }
        let mut out = Vec::with_capacity(self.len());
        for &n_trees in &self.n_trees {
            for &max_depth in &self.max_depth {
                for &max_features in &self.max_features {
                    let params = RandomForestParams {
                        n_trees,
                        max_depth,
                        max_features,
                        ..self.base.clone()
                    };
                    params.validate()?;
                    out.push(params);
                }
            }
        }
        Ok(out)
    }
}
