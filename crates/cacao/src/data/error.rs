//! Error types for table construction and splitting.

/// Errors raised by [`Table`](super::Table) operations and the feature/label splitter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// A required column is absent.
    #[error("column `{0}` not found")]
    MissingColumn(String),

    /// Two columns share a name.
    #[error("duplicate column `{0}`")]
    DuplicateColumn(String),

    /// A column length disagrees with the table's row count.
    #[error("column `{name}` has {got} rows, expected {expected}")]
    ShapeMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    /// A numeric column was required.
    #[error("column `{0}` is not numeric")]
    NotNumeric(String),

    /// A categorical column was required.
    #[error("column `{0}` is not categorical")]
    NotCategorical(String),

    /// Features and target do not share a row index.
    #[error("features and target have different row indices")]
    IndexMismatch,

    /// Column insert position past the end of the table.
    #[error("column position {position} out of range for {n_columns} columns")]
    PositionOutOfRange { position: usize, n_columns: usize },
}
