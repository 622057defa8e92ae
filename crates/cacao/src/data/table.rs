//! Column-oriented table with a shared row index.

use std::collections::HashSet;

use super::error::TableError;

// =============================================================================
// Column
// =============================================================================

/// Logical type of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    /// Continuous numeric values. Missing values are `f64::NAN`.
    Numeric,
    /// Nominal string values.
    Categorical,
}

impl ColumnKind {
    #[inline]
    pub fn is_categorical(self) -> bool {
        matches!(self, ColumnKind::Categorical)
    }
}

/// Column storage.
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<f64>),
    Categorical(Vec<String>),
}

/// A named column.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    /// Create a numeric column.
    pub fn numeric(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    /// Create a categorical column.
    pub fn categorical<S: Into<String>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Categorical(values.into_iter().map(Into::into).collect()),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn kind(&self) -> ColumnKind {
        match self.data {
            ColumnData::Numeric(_) => ColumnKind::Numeric,
            ColumnData::Categorical(_) => ColumnKind::Categorical,
        }
    }

    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Numeric values, or `None` for a categorical column.
    pub fn as_numeric(&self) -> Option<&[f64]> {
        match &self.data {
            ColumnData::Numeric(v) => Some(v),
            ColumnData::Categorical(_) => None,
        }
    }

    /// Category values, or `None` for a numeric column.
    pub fn as_categorical(&self) -> Option<&[String]> {
        match &self.data {
            ColumnData::Categorical(v) => Some(v),
            ColumnData::Numeric(_) => None,
        }
    }

    /// Rename, keeping the data.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Gather rows by position into a new column.
    pub fn select(&self, positions: &[usize]) -> Self {
        let data = match &self.data {
            ColumnData::Numeric(v) => ColumnData::Numeric(positions.iter().map(|&p| v[p]).collect()),
            ColumnData::Categorical(v) => {
                ColumnData::Categorical(positions.iter().map(|&p| v[p].clone()).collect())
            }
        };
        Self {
            name: self.name.clone(),
            data,
        }
    }
}

// =============================================================================
// Table
// =============================================================================

/// An ordered collection of named columns sharing a row index.
///
/// Rows are observations (one review each). All columns have the same length
/// as the index, and row `i` of every column belongs to observation `index[i]`.
///
/// # Example
///
/// ```
/// use cacao::data::{Column, Table};
///
/// let table = Table::new(vec![
///     Column::numeric("cocoa_percent", vec![0.7, 0.65]),
///     Column::categorical("bean_type", ["criollo", "blend"]),
/// ])
/// .unwrap();
///
/// assert_eq!(table.n_rows(), 2);
/// assert_eq!(table.column_names(), vec!["cocoa_percent", "bean_type"]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    index: Vec<usize>,
    columns: Vec<Column>,
}

impl Table {
    /// Build a table with the default index `0..n_rows`.
    ///
    /// The row count is taken from the first column; an empty column list
    /// produces an empty table.
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        let n_rows = columns.first().map(Column::len).unwrap_or(0);
        Self::with_index((0..n_rows).collect(), columns)
    }

    /// Build a table with an explicit row index.
    pub fn with_index(index: Vec<usize>, columns: Vec<Column>) -> Result<Self, TableError> {
        let mut seen = HashSet::with_capacity(columns.len());
        for col in &columns {
            if !seen.insert(col.name()) {
                return Err(TableError::DuplicateColumn(col.name().to_string()));
            }
            if col.len() != index.len() {
                return Err(TableError::ShapeMismatch {
                    name: col.name().to_string(),
                    expected: index.len(),
                    got: col.len(),
                });
            }
        }
        Ok(Self { index, columns })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Row identities, in row order.
    #[inline]
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Whether any column is categorical.
    pub fn has_categorical(&self) -> bool {
        self.columns.iter().any(|c| c.kind().is_categorical())
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Append a column.
    pub fn push_column(&mut self, column: Column) -> Result<(), TableError> {
        self.insert_column(self.columns.len(), column)
    }

    /// Insert a column at `position`, shifting later columns right.
    pub fn insert_column(&mut self, position: usize, column: Column) -> Result<(), TableError> {
        if position > self.columns.len() {
            return Err(TableError::PositionOutOfRange {
                position,
                n_columns: self.columns.len(),
            });
        }
        self.check_new_column(&column)?;
        self.columns.insert(position, column);
        Ok(())
    }

    /// Replace the column with the same name, keeping its position.
    pub fn replace_column(&mut self, column: Column) -> Result<Column, TableError> {
        let position = self
            .column_position(column.name())
            .ok_or_else(|| TableError::MissingColumn(column.name().to_string()))?;
        if column.len() != self.n_rows() {
            return Err(TableError::ShapeMismatch {
                name: column.name().to_string(),
                expected: self.n_rows(),
                got: column.len(),
            });
        }
        Ok(std::mem::replace(&mut self.columns[position], column))
    }

    /// Remove and return a column.
    pub fn drop_column(&mut self, name: &str) -> Result<Column, TableError> {
        let position = self
            .column_position(name)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))?;
        Ok(self.columns.remove(position))
    }

    fn check_new_column(&self, column: &Column) -> Result<(), TableError> {
        if self.column(column.name()).is_some() {
            return Err(TableError::DuplicateColumn(column.name().to_string()));
        }
        if column.len() != self.n_rows() {
            return Err(TableError::ShapeMismatch {
                name: column.name().to_string(),
                expected: self.n_rows(),
                got: column.len(),
            });
        }
        Ok(())
    }

    // =========================================================================
    // Row selection
    // =========================================================================

    /// Gather rows by position into a new table. The row index travels along.
    ///
    /// # Panics
    ///
    /// Panics if a position is out of bounds.
    pub fn select_rows(&self, positions: &[usize]) -> Table {
        Table {
            index: positions.iter().map(|&p| self.index[p]).collect(),
            columns: self.columns.iter().map(|c| c.select(positions)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(vec![
            Column::numeric("a", vec![1.0, 2.0, 3.0]),
            Column::categorical("b", ["x", "y", "x"]),
        ])
        .unwrap()
    }

    #[test]
    fn new_rejects_ragged_columns() {
        let err = Table::new(vec![
            Column::numeric("a", vec![1.0, 2.0]),
            Column::numeric("b", vec![1.0]),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            TableError::ShapeMismatch {
                name: "b".into(),
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn new_rejects_duplicate_names() {
        let err = Table::new(vec![
            Column::numeric("a", vec![1.0]),
            Column::numeric("a", vec![2.0]),
        ])
        .unwrap_err();
        assert_eq!(err, TableError::DuplicateColumn("a".into()));
    }

    #[test]
    fn select_rows_carries_index() {
        let table = sample();
        let sub = table.select_rows(&[2, 0]);
        assert_eq!(sub.index(), &[2, 0]);
        assert_eq!(sub.column("a").unwrap().as_numeric().unwrap(), &[3.0, 1.0]);
        assert_eq!(
            sub.column("b").unwrap().as_categorical().unwrap(),
            &["x".to_string(), "x".to_string()]
        );
        // source untouched
        assert_eq!(table.n_rows(), 3);
    }

    #[test]
    fn insert_and_drop_column() {
        let mut table = sample();
        table
            .insert_column(1, Column::numeric("c", vec![0.0, 0.0, 0.0]))
            .unwrap();
        assert_eq!(table.column_names(), vec!["a", "c", "b"]);

        let dropped = table.drop_column("c").unwrap();
        assert_eq!(dropped.name(), "c");
        assert_eq!(table.column_names(), vec!["a", "b"]);
        assert_eq!(
            table.drop_column("c").unwrap_err(),
            TableError::MissingColumn("c".into())
        );
    }

    #[test]
    fn replace_column_keeps_position() {
        let mut table = sample();
        let old = table
            .replace_column(Column::numeric("b", vec![7.0, 8.0, 9.0]))
            .unwrap();
        assert_eq!(old.kind(), ColumnKind::Categorical);
        assert_eq!(table.column_position("b"), Some(1));
        assert_eq!(table.column("b").unwrap().kind(), ColumnKind::Numeric);
    }
}
