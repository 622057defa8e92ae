//! Property-based tests for splitting, encoding, folds and the baseline.

use proptest::collection::vec as prop_vec;
use proptest::prelude::*;

use cacao::data::{join_features_labels, split_features_labels, Column, Table};
use cacao::encoding::{encode_aligned, indicator_sums};
use cacao::validation::{guess_from_mean, BaselineConfig, KFold};
use ndarray::Array1;

// =============================================================================
// Strategies
// =============================================================================

const CATEGORIES: [&str; 5] = ["blend", "criollo", "forasetero", "other", "trinitario"];

fn arb_category() -> impl Strategy<Value = String> {
    prop::sample::select(CATEGORIES.to_vec()).prop_map(str::to_string)
}

/// A table with `n` rows: two numeric and two categorical columns, with the
/// target placed at `target_pos`.
fn arb_table() -> impl Strategy<Value = Table> {
    (1usize..40, 0usize..5).prop_flat_map(|(n, target_pos)| {
        (
            prop_vec(-1e3f64..1e3, n),
            prop_vec(0.0f64..1.0, n),
            prop_vec(arb_category(), n),
            prop_vec(arb_category(), n),
            prop_vec(1.0f64..5.0, n),
        )
            .prop_map(move |(a, b, c, d, y)| {
                let mut columns = vec![
                    Column::numeric("review_year", a),
                    Column::numeric("cocoa_percent", b),
                    Column::categorical("bean_type", c),
                    Column::categorical("bean_origin", d),
                ];
                columns.insert(target_pos.min(columns.len()), Column::numeric("Rating", y));
                Table::new(columns).unwrap()
            })
    })
}

fn arb_origins(max: usize) -> impl Strategy<Value = Vec<String>> {
    prop_vec(arb_category(), 1..max)
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn split_then_join_reconstructs_table(table in arb_table()) {
        let (features, target) = split_features_labels(&table, "Rating").unwrap();
        prop_assert_eq!(features.n_columns(), table.n_columns() - 1);
        prop_assert_eq!(features.index(), target.index());
        prop_assert_eq!(join_features_labels(&features, &target).unwrap(), table);
    }

    #[test]
    fn aligned_encodings_share_columns(train in arb_origins(30), test in arb_origins(30)) {
        let as_table = |origins: &[String]| {
            let cocoa = (0..origins.len()).map(|i| i as f64 / 100.0).collect();
            Table::new(vec![
                Column::categorical("bean_origin", origins.iter().cloned()),
                Column::numeric("cocoa_percent", cocoa),
            ])
            .unwrap()
        };
        let (train_m, test_m) = encode_aligned(&as_table(&train), &as_table(&test)).unwrap();

        prop_assert_eq!(train_m.column_names(), test_m.column_names());
        prop_assert_eq!(train_m.n_samples(), train.len());
        prop_assert_eq!(test_m.n_samples(), test.len());

        for s in indicator_sums(&train_m, "bean_origin") {
            prop_assert_eq!(s, 1.0);
        }
        for (s, origin) in indicator_sums(&test_m, "bean_origin").into_iter().zip(&test) {
            let expected = if train.contains(origin) { 1.0 } else { 0.0 };
            prop_assert_eq!(s, expected);
        }
    }

    #[test]
    fn kfold_covers_each_row_once(n in 2usize..200, k in 2usize..10, seed in any::<u64>()) {
        prop_assume!(k <= n);
        let folds = KFold::new(k, seed).split(n).unwrap();
        let mut tested: Vec<usize> = folds.iter().flat_map(|f| f.test.iter().copied()).collect();
        tested.sort_unstable();
        prop_assert_eq!(tested, (0..n).collect::<Vec<_>>());
    }

    #[test]
    fn baseline_leave_one_out(values in prop_vec(0.0f64..5.0, 2..25)) {
        let y = Array1::from(values.clone());
        let n = values.len();
        let total: f64 = values.iter().sum();

        let errors = guess_from_mean(y.view(), &BaselineConfig { n_repeats: 1, n_folds: n }).unwrap();
        prop_assert_eq!(errors.len(), n);

        let fold = KFold::new(n, 0).split(n).unwrap();
        for (error, f) in errors.iter().zip(&fold) {
            let i = f.test[0];
            let loo_mean = (total - values[i]) / (n - 1) as f64;
            let expected = (values[i] - loo_mean).powi(2);
            prop_assert!((error - expected).abs() <= 1e-9 * (1.0 + expected));
        }
    }
}
