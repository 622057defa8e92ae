//! Mean-guessing baseline.

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

use super::kfold::KFold;
use super::ValidationError;

/// Repetitions and folds of the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineConfig {
    /// Repetitions; repetition `r` shuffles with seed `r`. Default: 10.
    pub n_repeats: usize,
    /// Folds per repetition. Default: 5.
    pub n_folds: usize,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            n_repeats: 10,
            n_folds: 5,
        }
    }
}

impl BaselineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_repeats == 0 {
            return Err(ConfigError::InvalidRepeats);
        }
        if self.n_folds < 2 {
            return Err(ConfigError::InvalidFolds {
                field: "n_folds",
                value: self.n_folds,
            });
        }
        Ok(())
    }
}

/// Mean squared error of predicting every held-out target with the mean of
/// the training-fold targets.
///
/// Returns `n_repeats × n_folds` errors, repetition by repetition.
///
/// # Example
///
/// ```
/// use cacao::validation::{guess_from_mean, BaselineConfig};
/// use ndarray::array;
///
/// let y = array![3.0, 3.5, 2.75, 4.0, 3.25, 3.0];
/// let errors = guess_from_mean(y.view(), &BaselineConfig { n_repeats: 2, n_folds: 3 }).unwrap();
/// assert_eq!(errors.len(), 6);
/// ```
pub fn guess_from_mean(
    targets: ArrayView1<'_, f64>,
    config: &BaselineConfig,
) -> Result<Vec<f64>, ValidationError> {
    config.validate()?;

    let mut errors = Vec::with_capacity(config.n_repeats * config.n_folds);
    for repeat in 0..config.n_repeats {
        for fold in KFold::new(config.n_folds, repeat as u64).split(targets.len())? {
            let mean = fold.train.iter().map(|&i| targets[i]).sum::<f64>() / fold.train.len() as f64;
            let mse = fold
                .test
                .iter()
                .map(|&i| (targets[i] - mean) * (targets[i] - mean))
                .sum::<f64>()
                / fold.test.len() as f64;
            errors.push(mse);
        }
    }

    tracing::debug!(
        n_errors = errors.len(),
        mean = errors.iter().sum::<f64>() / errors.len() as f64,
        "mean-guessing baseline complete"
    );
    Ok(errors)
}
