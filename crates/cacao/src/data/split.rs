//! Feature/label splitting.

use ndarray::{Array1, ArrayView1};

use super::error::TableError;
use super::table::{Column, Table};

/// The target vector, aligned row-for-row with its feature table.
#[derive(Clone, Debug, PartialEq)]
pub struct Target {
    name: String,
    /// Column position the target had in the source table.
    position: usize,
    index: Vec<usize>,
    values: Array1<f64>,
}

impl Target {
    /// Create a standalone target with the default index `0..n`.
    pub fn new(name: impl Into<String>, values: Array1<f64>) -> Self {
        let index = (0..values.len()).collect();
        Self {
            name: name.into(),
            position: 0,
            index,
            values,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    #[inline]
    pub fn values(&self) -> ArrayView1<'_, f64> {
        self.values.view()
    }

    /// Gather rows by position.
    pub fn select_rows(&self, positions: &[usize]) -> Target {
        Target {
            name: self.name.clone(),
            position: self.position,
            index: positions.iter().map(|&p| self.index[p]).collect(),
            values: positions.iter().map(|&p| self.values[p]).collect(),
        }
    }
}

/// Separate a table into features `X` and target `y`.
///
/// `X` keeps every other column in its original order and shares the row
/// index with `y`. The input table is not modified.
///
/// # Errors
///
/// - [`TableError::MissingColumn`] if `target` is absent
/// - [`TableError::NotNumeric`] if `target` is categorical
///
/// # Example
///
/// ```
/// use cacao::data::{split_features_labels, Column, Table};
///
/// let table = Table::new(vec![
///     Column::numeric("cocoa_percent", vec![0.7, 0.8]),
///     Column::numeric("Rating", vec![3.5, 2.75]),
/// ])
/// .unwrap();
///
/// let (x, y) = split_features_labels(&table, "Rating").unwrap();
/// assert_eq!(x.column_names(), vec!["cocoa_percent"]);
/// assert_eq!(y.values().to_vec(), vec![3.5, 2.75]);
/// ```
pub fn split_features_labels(table: &Table, target: &str) -> Result<(Table, Target), TableError> {
    let position = table
        .column_position(target)
        .ok_or_else(|| TableError::MissingColumn(target.to_string()))?;
    let column = &table.columns()[position];
    let values = column
        .as_numeric()
        .ok_or_else(|| TableError::NotNumeric(target.to_string()))?;

    let features: Vec<Column> = table
        .columns()
        .iter()
        .filter(|c| c.name() != target)
        .cloned()
        .collect();
    let x = Table::with_index(table.index().to_vec(), features)?;

    let y = Target {
        name: target.to_string(),
        position,
        index: table.index().to_vec(),
        values: Array1::from(values.to_vec()),
    };
    Ok((x, y))
}

/// Rejoin features and target into one table, restoring the target's
/// original column position.
///
/// # Errors
///
/// - [`TableError::IndexMismatch`] if the row indices differ
/// - [`TableError::DuplicateColumn`] if the features already hold a column
///   named like the target
pub fn join_features_labels(features: &Table, target: &Target) -> Result<Table, TableError> {
    if features.index() != target.index() {
        return Err(TableError::IndexMismatch);
    }
    let mut table = features.clone();
    let position = target.position.min(table.n_columns());
    table.insert_column(
        position,
        Column::numeric(target.name.clone(), target.values.to_vec()),
    )?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::columns::RATING;

    fn table() -> Table {
        Table::with_index(
            vec![10, 11, 12],
            vec![
                Column::categorical("company", ["A", "B", "C"]),
                Column::numeric("Rating", vec![3.0, 3.5, 4.0]),
                Column::numeric("cocoa_percent", vec![0.7, 0.72, 0.6]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn split_preserves_order_and_index() {
        let (x, y) = split_features_labels(&table(), RATING).unwrap();
        assert_eq!(x.column_names(), vec!["company", "cocoa_percent"]);
        assert_eq!(x.index(), &[10, 11, 12]);
        assert_eq!(y.index(), &[10, 11, 12]);
        assert_eq!(y.values().to_vec(), vec![3.0, 3.5, 4.0]);
    }

    #[test]
    fn split_missing_target_fails() {
        let err = split_features_labels(&table(), "score").unwrap_err();
        assert_eq!(err, TableError::MissingColumn("score".into()));
    }

    #[test]
    fn split_categorical_target_fails() {
        let err = split_features_labels(&table(), "company").unwrap_err();
        assert_eq!(err, TableError::NotNumeric("company".into()));
    }

    #[test]
    fn join_restores_original_table() {
        let original = table();
        let (x, y) = split_features_labels(&original, RATING).unwrap();
        assert_eq!(join_features_labels(&x, &y).unwrap(), original);
    }

    #[test]
    fn join_rejects_misaligned_rows() {
        let (x, y) = split_features_labels(&table(), RATING).unwrap();
        let y = y.select_rows(&[1, 0, 2]);
        assert_eq!(
            join_features_labels(&x, &y).unwrap_err(),
            TableError::IndexMismatch
        );
    }
}
