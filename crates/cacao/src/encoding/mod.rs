//! Categorical encoding.
//!
//! Converts a feature [`Table`](crate::data::Table) into a numeric
//! [`EncodedMatrix`] by one-hot encoding its categorical columns, and
//! reconciles matrices encoded from different row subsets so they expose the
//! same columns in the same order.

mod matrix;
mod onehot;

pub use matrix::{EncodedColumn, EncodedKind, EncodedMatrix};
pub use onehot::{align, encode_aligned, indicator_sums, one_hot_encode};

/// Errors raised by encoding and alignment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    /// Matrix values disagree with the column list or row index.
    #[error("feature array has shape {got:?}, expected {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },

    /// Two encoded columns share a name.
    #[error("duplicate encoded column `{0}`")]
    DuplicateColumn(String),

    /// Source tables do not share a column of the same kind.
    #[error("column `{0}` is not shared by both inputs")]
    SchemaMismatch(String),

    /// Column sets still disagree after alignment.
    #[error("aligned column sets differ ({} train vs {} test columns)", train.len(), test.len())]
    Inconsistent { train: Vec<String>, test: Vec<String> },

    #[error("internal encoding error: {0}")]
    Internal(String),
}
