//! One-hot encoding and train/test column alignment.

use std::collections::{BTreeSet, HashMap, HashSet};

use ndarray::Array2;

use crate::data::{ColumnData, Table};

use super::matrix::{EncodedColumn, EncodedMatrix};
use super::EncodingError;

/// One-hot encode a feature table.
///
/// Numeric columns pass through in their original order, followed by each
/// categorical column expanded into one indicator column per observed
/// category (`"{column}_{category}"`, categories sorted). Every row has
/// exactly one indicator set per categorical source column.
///
/// # Example
///
/// ```
/// use cacao::data::{Column, Table};
/// use cacao::encoding::one_hot_encode;
///
/// let table = Table::new(vec![
///     Column::categorical("bean_type", ["criollo", "blend", "criollo"]),
///     Column::numeric("cocoa_percent", vec![0.7, 0.6, 0.75]),
/// ])
/// .unwrap();
///
/// let encoded = one_hot_encode(&table).unwrap();
/// assert_eq!(
///     encoded.column_names(),
///     vec!["cocoa_percent", "bean_type_blend", "bean_type_criollo"]
/// );
/// assert_eq!(encoded.column("bean_type_criollo").unwrap().to_vec(), vec![1.0, 0.0, 1.0]);
/// ```
pub fn one_hot_encode(table: &Table) -> Result<EncodedMatrix, EncodingError> {
    let n_samples = table.n_rows();
    let mut columns = Vec::new();
    let mut values: Vec<f64> = Vec::new();

    for col in table.columns() {
        if let ColumnData::Numeric(v) = col.data() {
            columns.push(EncodedColumn::numeric(col.name()));
            values.extend_from_slice(v);
        }
    }

    for col in table.columns() {
        if let ColumnData::Categorical(v) = col.data() {
            let categories: BTreeSet<&str> = v.iter().map(String::as_str).collect();
            for category in categories {
                columns.push(EncodedColumn::indicator(col.name(), category));
                values.extend(v.iter().map(|x| if x == category { 1.0 } else { 0.0 }));
            }
        }
    }

    let features = Array2::from_shape_vec((columns.len(), n_samples), values)
        .map_err(|e| EncodingError::Internal(e.to_string()))?;
    EncodedMatrix::new(columns, table.index().to_vec(), features)
}

/// Reconcile two independently encoded matrices.
///
/// Indicator columns present in `train` but absent from `test` are added to
/// `test` as all-zero columns (the category never occurs there). Both
/// matrices are then restricted to their common columns in training order, so
/// columns seen only in `test` are dropped. Row counts and row identities are
/// unchanged.
///
/// # Errors
///
/// - [`EncodingError::SchemaMismatch`] if a numeric column is missing from
///   one side (a zero fill would be wrong for it)
/// - [`EncodingError::Inconsistent`] if the outputs still disagree
pub fn align(
    train: EncodedMatrix,
    test: EncodedMatrix,
) -> Result<(EncodedMatrix, EncodedMatrix), EncodingError> {
    let test_positions: HashMap<&str, usize> = test
        .columns()
        .iter()
        .enumerate()
        .map(|(i, c)| (c.name.as_str(), i))
        .collect();
    let train_names: HashSet<&str> = train.columns().iter().map(|c| c.name.as_str()).collect();

    for col in train.columns().iter().chain(test.columns()) {
        let on_both = train_names.contains(col.name.as_str())
            && test_positions.contains_key(col.name.as_str());
        if !col.is_indicator() && !on_both {
            return Err(EncodingError::SchemaMismatch(col.source.clone()));
        }
    }

    let n_test = test.n_samples();
    let zeros = vec![0.0; n_test];
    let mut added = 0usize;
    let test_features = test.features();
    let mut values = Vec::with_capacity(train.n_features() * n_test);
    for col in train.columns() {
        match test_positions.get(col.name.as_str()) {
            Some(&i) => values.extend(test_features.row(i).iter().copied()),
            None => {
                added += 1;
                values.extend_from_slice(&zeros);
            }
        }
    }
    let dropped = test
        .columns()
        .iter()
        .filter(|c| !train_names.contains(c.name.as_str()))
        .count();

    let features = Array2::from_shape_vec((train.n_features(), n_test), values)
        .map_err(|e| EncodingError::Internal(e.to_string()))?;
    let aligned_test = EncodedMatrix::new(train.columns().to_vec(), test.index().to_vec(), features)?;

    tracing::debug!(
        n_columns = train.n_features(),
        added,
        dropped,
        "aligned one-hot columns"
    );

    if train.column_names() != aligned_test.column_names() {
        return Err(EncodingError::Inconsistent {
            train: train.column_names().iter().map(|s| s.to_string()).collect(),
            test: aligned_test
                .column_names()
                .iter()
                .map(|s| s.to_string())
                .collect(),
        });
    }
    Ok((train, aligned_test))
}

/// Encode a training and a test table independently, then [`align`] them.
///
/// # Errors
///
/// [`EncodingError::SchemaMismatch`] if the tables do not share source
/// columns of the same kinds.
pub fn encode_aligned(
    train: &Table,
    test: &Table,
) -> Result<(EncodedMatrix, EncodedMatrix), EncodingError> {
    for (a, b) in [(train, test), (test, train)] {
        for col in a.columns() {
            match b.column(col.name()) {
                Some(other) if other.kind() == col.kind() => {}
                _ => return Err(EncodingError::SchemaMismatch(col.name().to_string())),
            }
        }
    }
    align(one_hot_encode(train)?, one_hot_encode(test)?)
}

/// Sum of the indicator columns derived from `source`, per sample.
///
/// Equals 1 for every sample of a freshly encoded matrix and may be 0 for a
/// test sample whose category was dropped by [`align`].
pub fn indicator_sums(matrix: &EncodedMatrix, source: &str) -> Vec<f64> {
    let features = matrix.features();
    let mut sums = vec![0.0; matrix.n_samples()];
    for (i, col) in matrix.columns().iter().enumerate() {
        if col.is_indicator() && col.source == source {
            for (s, &v) in sums.iter_mut().zip(features.row(i).iter()) {
                *s += v;
            }
        }
    }
    sums
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Column;

    fn table(origins: &[&str], cocoa: &[f64]) -> Table {
        Table::new(vec![
            Column::categorical("bean_origin", origins.iter().copied()),
            Column::numeric("cocoa_percent", cocoa.to_vec()),
        ])
        .unwrap()
    }

    #[test]
    fn encode_expands_sorted_categories() {
        let encoded = one_hot_encode(&table(&["peru", "ghana", "peru"], &[0.7, 0.6, 0.8])).unwrap();
        assert_eq!(
            encoded.column_names(),
            vec!["cocoa_percent", "bean_origin_ghana", "bean_origin_peru"]
        );
        assert_eq!(encoded.n_samples(), 3);
        assert_eq!(indicator_sums(&encoded, "bean_origin"), vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn align_fills_train_only_and_drops_test_only() {
        let train = table(&["peru", "ghana", "peru"], &[0.7, 0.6, 0.8]);
        let test = table(&["peru", "fiji"], &[0.5, 0.9]);
        let (train, test) = encode_aligned(&train, &test).unwrap();

        assert_eq!(train.column_names(), test.column_names());
        assert_eq!(test.column("bean_origin_ghana").unwrap().to_vec(), vec![0.0, 0.0]);
        assert!(test.column("bean_origin_fiji").is_none());
        assert_eq!(test.column("cocoa_percent").unwrap().to_vec(), vec![0.5, 0.9]);
        assert_eq!(indicator_sums(&test, "bean_origin"), vec![1.0, 0.0]);
        assert_eq!(test.index(), &[0, 1]);
    }

    #[test]
    fn encode_aligned_rejects_schema_mismatch() {
        let train = table(&["peru"], &[0.7]);
        let test = Table::new(vec![Column::categorical("bean_origin", ["peru"])]).unwrap();
        assert_eq!(
            encode_aligned(&train, &test).unwrap_err(),
            EncodingError::SchemaMismatch("cocoa_percent".into())
        );
    }
}
