//! Numeric summaries of score distributions.
//!
//! Produces plain numbers for downstream plotting and reporting; nothing
//! here renders or formats output beyond JSON serialization.

use serde::Serialize;

use crate::validation::{MetricKind, NestedScores, OuterFoldResult};

/// Histogram bins used when none are requested explicitly.
pub const DEFAULT_BINS: usize = 10;

/// Descriptive statistics of a score sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample variance (`n - 1` denominator). `NaN` for a single value.
    pub variance: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl ScoreSummary {
    /// Summarize `values`. Returns `None` for an empty slice.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = if values.len() > 1 {
            values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (n - 1.0)
        } else {
            f64::NAN
        };
        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        Some(Self {
            count: values.len(),
            mean,
            variance,
            std: variance.sqrt(),
            min,
            max,
        })
    }
}

/// Equal-width histogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// `n_bins + 1` ascending bin edges.
    pub edges: Vec<f64>,
    /// Values per bin. The last bin includes its right edge.
    pub counts: Vec<usize>,
}

/// Bin the finite entries of `values` into `n_bins` equal-width bins
/// spanning their range.
///
/// A degenerate range (all values equal) is widened by 0.5 on each side.
/// An input without finite values yields empty edges and counts.
pub fn histogram(values: &[f64], n_bins: usize) -> Histogram {
    let n_bins = n_bins.max(1);
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return Histogram {
            edges: Vec::new(),
            counts: Vec::new(),
        };
    }

    let (mut lo, mut hi) = finite
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / n_bins as f64;
    let edges: Vec<f64> = (0..=n_bins)
        .map(|i| if i == n_bins { hi } else { lo + width * i as f64 })
        .collect();

    let mut counts = vec![0usize; n_bins];
    for v in finite {
        let bin = (((v - lo) / width) as usize).min(n_bins - 1);
        counts[bin] += 1;
    }
    Histogram { edges, counts }
}

/// A score sample with its summary and histogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub values: Vec<f64>,
    pub summary: Option<ScoreSummary>,
    pub histogram: Histogram,
}

impl Distribution {
    pub fn new(values: Vec<f64>, n_bins: usize) -> Self {
        Self {
            summary: ScoreSummary::from_values(&values),
            histogram: histogram(&values, n_bins),
            values,
        }
    }
}

/// Nested cross-validation section of a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NestedReport {
    pub metric: MetricKind,
    /// Scores per trial, one entry per outer fold.
    pub scores: Vec<Vec<f64>>,
    pub distribution: Distribution,
    pub folds: Vec<OuterFoldResult>,
    /// Labels of the grid candidates, indexed by `folds[..].selected`.
    pub candidates: Vec<String>,
}

impl NestedReport {
    pub fn new(scores: &NestedScores, candidates: Vec<String>, n_bins: usize) -> Self {
        Self {
            metric: scores.metric(),
            scores: scores.scores().rows().into_iter().map(|r| r.to_vec()).collect(),
            distribution: Distribution::new(scores.flat(), n_bins),
            folds: scores.folds().to_vec(),
            candidates,
        }
    }
}

/// Shape of the evaluated dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub n_rows: usize,
    pub n_features: usize,
    pub target: String,
}

/// Everything an evaluation run produced, ready for JSON output.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct EvaluationReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<DatasetSummary>,
    /// Mean-guessing MSE per (repetition, fold).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline: Option<Distribution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nested: Option<NestedReport>,
}

impl EvaluationReport {
    pub fn with_dataset(mut self, dataset: DatasetSummary) -> Self {
        self.dataset = Some(dataset);
        self
    }

    pub fn with_baseline(mut self, errors: Vec<f64>) -> Self {
        self.baseline = Some(Distribution::new(errors, DEFAULT_BINS));
        self
    }

    pub fn with_nested(mut self, scores: &NestedScores, candidates: Vec<String>) -> Self {
        self.nested = Some(NestedReport::new(scores, candidates, DEFAULT_BINS));
        self
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn summary_uses_sample_variance() {
        let s = ScoreSummary::from_values(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(s.count, 4);
        assert_abs_diff_eq!(s.mean, 2.5);
        assert_abs_diff_eq!(s.variance, 5.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s.std, (5.0f64 / 3.0).sqrt(), epsilon = 1e-12);
        assert_eq!((s.min, s.max), (1.0, 4.0));
    }

    #[test]
    fn summary_edge_cases() {
        assert!(ScoreSummary::from_values(&[]).is_none());
        assert!(ScoreSummary::from_values(&[7.0]).unwrap().variance.is_nan());
    }

    #[test]
    fn histogram_counts_every_finite_value() {
        let h = histogram(&[0.0, 0.1, 0.5, 0.9, 1.0, f64::NAN], 2);
        assert_eq!(h.edges, vec![0.0, 0.5, 1.0]);
        assert_eq!(h.counts, vec![2, 3]);
    }

    #[test]
    fn histogram_degenerate_range() {
        let h = histogram(&[3.0, 3.0], 1);
        assert_eq!(h.edges, vec![2.5, 3.5]);
        assert_eq!(h.counts, vec![2]);
        assert!(histogram(&[], 4).counts.is_empty());
    }

    #[test]
    fn report_skips_missing_sections() {
        let json = EvaluationReport::default().with_baseline(vec![0.2, 0.3]).to_json_pretty().unwrap();
        assert!(json.contains("\"baseline\""));
        assert!(!json.contains("\"nested\""));
    }
}
