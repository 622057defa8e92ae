//! Regression scoring metrics.
//!
//! All metrics take predictions and targets of equal length. An empty input
//! scores 0.

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// A scoring function over predictions and targets.
pub trait MetricFn: Send + Sync {
    fn compute(&self, predictions: ArrayView1<'_, f64>, targets: ArrayView1<'_, f64>) -> f64;

    /// Whether larger values indicate a better model.
    fn higher_is_better(&self) -> bool;

    fn name(&self) -> &'static str;
}

fn sum_squared_error(predictions: ArrayView1<'_, f64>, targets: ArrayView1<'_, f64>) -> f64 {
    predictions
        .iter()
        .zip(targets.iter())
        .map(|(&p, &y)| (p - y) * (p - y))
        .sum()
}

// =============================================================================
// MSE
// =============================================================================

/// Mean Squared Error: mean((pred - label)²)
#[derive(Debug, Clone, Copy, Default)]
pub struct Mse;

impl MetricFn for Mse {
    fn compute(&self, predictions: ArrayView1<'_, f64>, targets: ArrayView1<'_, f64>) -> f64 {
        let n = targets.len();
        if n == 0 {
            return 0.0;
        }
        sum_squared_error(predictions, targets) / n as f64
    }

    fn higher_is_better(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "mse"
    }
}

// =============================================================================
// RMSE
// =============================================================================

/// Root Mean Squared Error: sqrt(mean((pred - label)²))
#[derive(Debug, Clone, Copy, Default)]
pub struct Rmse;

impl MetricFn for Rmse {
    fn compute(&self, predictions: ArrayView1<'_, f64>, targets: ArrayView1<'_, f64>) -> f64 {
        Mse.compute(predictions, targets).sqrt()
    }

    fn higher_is_better(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "rmse"
    }
}

// =============================================================================
// MAE
// =============================================================================

/// Mean Absolute Error: mean(|pred - label|)
#[derive(Debug, Clone, Copy, Default)]
pub struct Mae;

impl MetricFn for Mae {
    fn compute(&self, predictions: ArrayView1<'_, f64>, targets: ArrayView1<'_, f64>) -> f64 {
        let n = targets.len();
        if n == 0 {
            return 0.0;
        }
        let sum: f64 = predictions
            .iter()
            .zip(targets.iter())
            .map(|(&p, &y)| (p - y).abs())
            .sum();
        sum / n as f64
    }

    fn higher_is_better(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "mae"
    }
}

// =============================================================================
// R²
// =============================================================================

/// Coefficient of determination: 1 - SS_res / SS_tot.
///
/// When the targets are constant (`SS_tot == 0`) the score is 1 for a
/// perfect fit and 0 otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct R2;

impl MetricFn for R2 {
    fn compute(&self, predictions: ArrayView1<'_, f64>, targets: ArrayView1<'_, f64>) -> f64 {
        let n = targets.len();
        if n == 0 {
            return 0.0;
        }
        let mean = targets.sum() / n as f64;
        let ss_tot: f64 = targets.iter().map(|&y| (y - mean) * (y - mean)).sum();
        let ss_res = sum_squared_error(predictions, targets);
        if ss_tot == 0.0 {
            return if ss_res == 0.0 { 1.0 } else { 0.0 };
        }
        1.0 - ss_res / ss_tot
    }

    fn higher_is_better(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "r2"
    }
}

// =============================================================================
// Metric
// =============================================================================

/// Runtime-selected metric.
#[derive(Debug, Clone, Copy)]
pub enum Metric {
    Mse(Mse),
    Rmse(Rmse),
    Mae(Mae),
    R2(R2),
}

impl Default for Metric {
    fn default() -> Self {
        Self::R2(R2)
    }
}

impl Metric {
    pub fn mse() -> Self {
        Self::Mse(Mse)
    }

    pub fn rmse() -> Self {
        Self::Rmse(Rmse)
    }

    pub fn mae() -> Self {
        Self::Mae(Mae)
    }

    pub fn r2() -> Self {
        Self::R2(R2)
    }

    /// Serializable identifier for this metric.
    pub fn kind(&self) -> MetricKind {
        match self {
            Self::Mse(_) => MetricKind::Mse,
            Self::Rmse(_) => MetricKind::Rmse,
            Self::Mae(_) => MetricKind::Mae,
            Self::R2(_) => MetricKind::R2,
        }
    }

    /// Whether `a` is strictly better than `b` under this metric.
    #[inline]
    pub fn is_better(&self, a: f64, b: f64) -> bool {
        if self.higher_is_better() { a > b } else { a < b }
    }
}

impl MetricFn for Metric {
    fn compute(&self, predictions: ArrayView1<'_, f64>, targets: ArrayView1<'_, f64>) -> f64 {
        match self {
            Self::Mse(inner) => inner.compute(predictions, targets),
            Self::Rmse(inner) => inner.compute(predictions, targets),
            Self::Mae(inner) => inner.compute(predictions, targets),
            Self::R2(inner) => inner.compute(predictions, targets),
        }
    }

    fn higher_is_better(&self) -> bool {
        match self {
            Self::Mse(inner) => inner.higher_is_better(),
            Self::Rmse(inner) => inner.higher_is_better(),
            Self::Mae(inner) => inner.higher_is_better(),
            Self::R2(inner) => inner.higher_is_better(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Mse(inner) => inner.name(),
            Self::Rmse(inner) => inner.name(),
            Self::Mae(inner) => inner.name(),
            Self::R2(inner) => inner.name(),
        }
    }
}

/// Serializable metric identifier (`"mse"`, `"rmse"`, `"mae"`, `"r2"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Mse,
    Rmse,
    Mae,
    #[default]
    R2,
}

impl From<MetricKind> for Metric {
    fn from(kind: MetricKind) -> Self {
        match kind {
            MetricKind::Mse => Metric::mse(),
            MetricKind::Rmse => Metric::rmse(),
            MetricKind::Mae => Metric::mae(),
            MetricKind::R2 => Metric::r2(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn error_metrics() {
        let p = array![1.0, 2.0, 5.0];
        let y = array![1.0, 4.0, 2.0];
        assert_abs_diff_eq!(Mse.compute(p.view(), y.view()), 13.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(Rmse.compute(p.view(), y.view()), (13.0f64 / 3.0).sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(Mae.compute(p.view(), y.view()), 5.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn r2_perfect_and_mean() {
        let y = array![1.0, 2.0, 3.0, 4.0];
        assert_abs_diff_eq!(R2.compute(y.view(), y.view()), 1.0);
        let mean = array![2.5, 2.5, 2.5, 2.5];
        assert_abs_diff_eq!(R2.compute(mean.view(), y.view()), 0.0);
    }

    #[test]
    fn r2_constant_targets() {
        let y = array![3.0, 3.0];
        assert_eq!(R2.compute(array![3.0, 3.0].view(), y.view()), 1.0);
        assert_eq!(R2.compute(array![2.0, 3.0].view(), y.view()), 0.0);
    }

    #[test]
    fn direction() {
        assert!(Metric::r2().is_better(0.5, 0.4));
        assert!(Metric::mse().is_better(0.4, 0.5));
        assert!(!Metric::mae().is_better(0.5, 0.5));
    }

    #[test]
    fn kind_round_trips_through_json() {
        let kind: MetricKind = serde_json::from_str("\"rmse\"").unwrap();
        assert_eq!(Metric::from(kind).name(), "rmse");
        assert_eq!(Metric::default().kind(), MetricKind::R2);
    }
}
