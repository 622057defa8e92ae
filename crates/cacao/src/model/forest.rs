//! Random forest regressor.
//!
//! [`RandomForestParams`] is the estimator configuration; fitting it yields a
//! [`RandomForest`]. Each tree is grown on a bootstrap resample with
//! per-node feature subsampling. Per-tree seeds are drawn up front from the
//! configured seed, so the fitted forest does not depend on thread count.
//!
//! # Example
//!
//! ```
//! use cacao::model::{MaxFeatures, Predict, RandomForestParams, Regressor};
//! use cacao::Parallelism;
//! use ndarray::array;
//!
//! let params = RandomForestParams::builder()
//!     .n_trees(10)
//!     .max_depth(3)
//!     .max_features(MaxFeatures::All)
//!     .build()
//!     .unwrap();
//!
//! // [n_features = 1, n_samples = 6]
//! let x = array![[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]];
//! let y = array![1.0, 1.0, 1.0, 3.0, 3.0, 3.0];
//! let forest = params.fit(x.view(), y.view(), Parallelism::Sequential).unwrap();
//! let pred = forest.predict(x.view(), Parallelism::Sequential).unwrap();
//! assert_eq!(pred.len(), 6);
//! ```

use bon::Builder;
use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::{Rng, RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::utils::Parallelism;

use super::tree::{grow_tree, GrowParams, RegressionTree};
use super::{check_training_data, ModelError, Predict, Regressor};

// =============================================================================
// MaxFeatures
// =============================================================================

/// Number of features examined when searching for each split.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    /// Every feature.
    #[default]
    All,
    /// `floor(sqrt(n_features))`, at least 1.
    Sqrt,
    /// `floor(log2(n_features))`, at least 1.
    Log2,
    /// `floor(fraction * n_features)`, at least 1. Must be in `(0, 1]`.
    Fraction(f64),
}

impl MaxFeatures {
    /// Resolve to a feature count for a matrix with `n_features` columns.
    pub fn resolve(self, n_features: usize) -> usize {
        let n = n_features as f64;
        let k = match self {
            Self::All => n_features,
            Self::Sqrt => n.sqrt().floor() as usize,
            Self::Log2 => n.log2().floor() as usize,
            Self::Fraction(f) => (f * n).floor() as usize,
        };
        k.clamp(1, n_features.max(1))
    }
}

impl std::fmt::Display for MaxFeatures {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Sqrt => f.write_str("sqrt"),
            Self::Log2 => f.write_str("log2"),
            Self::Fraction(v) => write!(f, "{v}"),
        }
    }
}

// =============================================================================
// RandomForestParams
// =============================================================================

/// Random forest hyperparameters.
///
/// Built through [`RandomForestParams::builder`], which validates on
/// `build()`. Deserialized values should be checked with
/// [`validate`](Self::validate).
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(derive(Clone, Debug), finish_fn(vis = "", name = __build_internal))]
#[serde(default)]
pub struct RandomForestParams {
    /// Number of trees. Default: 100.
    #[builder(default = 100)]
    pub n_trees: u32,

    /// Maximum tree depth. `None` grows until leaves are pure or too small.
    pub max_depth: Option<u32>,

    /// Minimum samples required to split a node. Default: 2.
    #[builder(default = 2)]
    pub min_samples_split: usize,

    /// Minimum samples in each child of a split. Default: 1.
    #[builder(default = 1)]
    pub min_samples_leaf: usize,

    /// Features examined per split. Default: all.
    #[builder(default)]
    pub max_features: MaxFeatures,

    /// Grow each tree on a bootstrap resample. Default: true.
    #[builder(default = true)]
    pub bootstrap: bool,

    /// Master seed for bootstrap and feature sampling. Default: 42.
    #[builder(default = 42)]
    pub seed: u64,
}

impl<S: random_forest_params_builder::IsComplete> RandomForestParamsBuilder<S> {
    /// Build and validate the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `n_trees == 0`, `max_depth == Some(0)`,
    /// `min_samples_split < 2`, `min_samples_leaf == 0`, or a fractional
    /// `max_features` lies outside `(0, 1]`.
    pub fn build(self) -> Result<RandomForestParams, ConfigError> {
        let params = self.__build_internal();
        params.validate()?;
        Ok(params)
    }
}

impl Default for RandomForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
            bootstrap: true,
            seed: 42,
        }
    }
}

impl RandomForestParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_trees == 0 {
            return Err(ConfigError::InvalidNTrees);
        }
        if self.max_depth == Some(0) {
            return Err(ConfigError::InvalidMaxDepth);
        }
        if self.min_samples_split < 2 {
            return Err(ConfigError::InvalidMinSamples {
                field: "min_samples_split",
                value: self.min_samples_split,
            });
        }
        if self.min_samples_leaf == 0 {
            return Err(ConfigError::InvalidMinSamples {
                field: "min_samples_leaf",
                value: 0,
            });
        }
        if let MaxFeatures::Fraction(f) = self.max_features {
            if !(f > 0.0 && f <= 1.0) {
                return Err(ConfigError::InvalidMaxFeatures(f));
            }
        }
        Ok(())
    }

    /// Short human-readable label, e.g. `n_trees=100,max_depth=5,max_features=sqrt`.
    pub fn label(&self) -> String {
        let depth = self
            .max_depth
            .map_or_else(|| "none".to_string(), |d| d.to_string());
        format!(
            "n_trees={},max_depth={},max_features={}",
            self.n_trees, depth, self.max_features
        )
    }
}

impl Regressor for RandomForestParams {
    type Model = RandomForest;

    fn fit(
        &self,
        features: ArrayView2<'_, f64>,
        targets: ArrayView1<'_, f64>,
        parallelism: Parallelism,
    ) -> Result<RandomForest, ModelError> {
        RandomForest::fit(self, features, targets, parallelism)
    }
}

// =============================================================================
// RandomForest
// =============================================================================

/// A fitted random forest. Predictions are the mean over trees.
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<RegressionTree>,
    n_features: usize,
    params: RandomForestParams,
}

impl RandomForest {
    /// Fit a forest to `[n_features, n_samples]` features.
    pub fn fit(
        params: &RandomForestParams,
        features: ArrayView2<'_, f64>,
        targets: ArrayView1<'_, f64>,
        parallelism: Parallelism,
    ) -> Result<Self, ModelError> {
        check_training_data(features, targets)?;

        let n_samples = targets.len();
        let n_features = features.nrows();
        let grow = GrowParams {
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split,
            min_samples_leaf: params.min_samples_leaf,
            max_features: params.max_features.resolve(n_features),
        };

        let mut master = Xoshiro256PlusPlus::seed_from_u64(params.seed);
        let seeds: Vec<u64> = (0..params.n_trees).map(|_| master.next_u64()).collect();

        let trees = parallelism.maybe_par_map(seeds, |seed| {
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
            let samples: Vec<usize> = if params.bootstrap {
                (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
            } else {
                (0..n_samples).collect()
            };
            grow_tree(features, targets, samples, &grow, &mut rng)
        });

        tracing::trace!(
            n_trees = trees.len(),
            n_samples,
            n_features,
            max_features = grow.max_features,
            "fitted random forest"
        );

        Ok(Self {
            trees,
            n_features,
            params: params.clone(),
        })
    }

    #[inline]
    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    #[inline]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    #[inline]
    pub fn params(&self) -> &RandomForestParams {
        &self.params
    }
}

impl Predict for RandomForest {
    fn predict(
        &self,
        features: ArrayView2<'_, f64>,
        parallelism: Parallelism,
    ) -> Result<Array1<f64>, ModelError> {
        if features.nrows() != self.n_features {
            return Err(ModelError::FeatureCountMismatch {
                expected: self.n_features,
                got: features.nrows(),
            });
        }
        let n_trees = self.trees.len() as f64;
        let preds = parallelism.maybe_par_map(0..features.ncols(), |j| {
            let sample = features.column(j);
            self.trees.iter().map(|t| t.predict_sample(sample)).sum::<f64>() / n_trees
        });
        Ok(Array1::from(preds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};
    use rstest::rstest;

    fn linear_data(n: usize) -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((2, n), |(f, j)| if f == 0 { j as f64 } else { (j % 3) as f64 });
        let y = x.row(0).mapv(|v| 2.0 * v + 1.0);
        (x, y)
    }

    #[test]
    fn builder_defaults() {
        let params = RandomForestParams::builder().build().unwrap();
        assert_eq!(params, RandomForestParams::default());
        assert_eq!(params.seed, 42);
        assert!(params.bootstrap);
    }

    #[rstest]
    #[case(RandomForestParams { n_trees: 0, ..Default::default() }, ConfigError::InvalidNTrees)]
    #[case(RandomForestParams { max_depth: Some(0), ..Default::default() }, ConfigError::InvalidMaxDepth)]
    #[case(
        RandomForestParams { min_samples_leaf: 0, ..Default::default() },
        ConfigError::InvalidMinSamples { field: "min_samples_leaf", value: 0 }
    )]
    #[case(
        RandomForestParams { max_features: MaxFeatures::Fraction(1.5), ..Default::default() },
        ConfigError::InvalidMaxFeatures(1.5)
    )]
    fn validate_rejects(#[case] params: RandomForestParams, #[case] expected: ConfigError) {
        assert_eq!(params.validate(), Err(expected));
    }

    #[rstest]
    #[case(MaxFeatures::All, 100, 100)]
    #[case(MaxFeatures::Sqrt, 100, 10)]
    #[case(MaxFeatures::Log2, 100, 6)]
    #[case(MaxFeatures::Fraction(0.25), 100, 25)]
    #[case(MaxFeatures::Fraction(0.01), 10, 1)]
    #[case(MaxFeatures::Sqrt, 1, 1)]
    fn max_features_resolve(#[case] mf: MaxFeatures, #[case] n: usize, #[case] expected: usize) {
        assert_eq!(mf.resolve(n), expected);
    }

    #[test]
    fn fits_linear_signal() {
        let (x, y) = linear_data(60);
        let params = RandomForestParams::builder().n_trees(20).build().unwrap();
        let forest = params.fit(x.view(), y.view(), Parallelism::Sequential).unwrap();
        let pred = forest.predict(x.view(), Parallelism::Sequential).unwrap();

        let mse = (&pred - &y).mapv(|e| e * e).mean().unwrap();
        assert!(mse < 10.0, "training mse too high: {mse}");
        for tree in forest.trees() {
            assert!(tree.validate().is_ok());
        }
    }

    #[test]
    fn parallel_fit_matches_sequential() {
        let (x, y) = linear_data(40);
        let params = RandomForestParams::builder()
            .n_trees(8)
            .max_features(MaxFeatures::Sqrt)
            .seed(7)
            .build()
            .unwrap();
        let seq = params.fit(x.view(), y.view(), Parallelism::Sequential).unwrap();
        let par = params.fit(x.view(), y.view(), Parallelism::Parallel).unwrap();
        assert_eq!(seq.trees(), par.trees());

        let a = seq.predict(x.view(), Parallelism::Sequential).unwrap();
        let b = par.predict(x.view(), Parallelism::Parallel).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn constant_target_predicts_constant() {
        let x = array![[0.0, 1.0, 2.0, 3.0]];
        let y = array![4.0, 4.0, 4.0, 4.0];
        let forest = RandomForestParams::default()
            .fit(x.view(), y.view(), Parallelism::Sequential)
            .unwrap();
        let pred = forest.predict(array![[10.0]].view(), Parallelism::Sequential).unwrap();
        assert_abs_diff_eq!(pred[0], 4.0, epsilon = 1e-12);
    }

    #[test]
    fn fit_rejects_bad_input() {
        let x = array![[0.0, 1.0]];
        assert_eq!(
            RandomForestParams::default()
                .fit(x.view(), array![1.0].view(), Parallelism::Sequential)
                .unwrap_err(),
            ModelError::LengthMismatch { features: 2, targets: 1 }
        );
        assert_eq!(
            RandomForestParams::default()
                .fit(x.view(), array![1.0, f64::NAN].view(), Parallelism::Sequential)
                .unwrap_err(),
            ModelError::NonFiniteTarget(1)
        );
    }

    #[test]
    fn predict_rejects_wrong_feature_count() {
        let (x, y) = linear_data(10);
        let forest = RandomForestParams::builder()
            .n_trees(2)
            .build()
            .unwrap()
            .fit(x.view(), y.view(), Parallelism::Sequential)
            .unwrap();
        assert_eq!(
            forest
                .predict(array![[1.0]].view(), Parallelism::Sequential)
                .unwrap_err(),
            ModelError::FeatureCountMismatch { expected: 2, got: 1 }
        );
    }
}
