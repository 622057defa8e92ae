//! Numeric feature matrix produced by one-hot encoding.

use std::collections::HashSet;

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

use super::EncodingError;

/// What an encoded column represents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EncodedKind {
    /// A numeric source column, passed through unchanged.
    Numeric,
    /// Indicator for one category of a categorical source column.
    Indicator { category: String },
}

/// Metadata for one encoded column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedColumn {
    /// Encoded column name (`"{source}_{category}"` for indicators).
    pub name: String,
    /// Name of the source column in the feature table.
    pub source: String,
    pub kind: EncodedKind,
}

impl EncodedColumn {
    pub fn numeric(source: impl Into<String>) -> Self {
        let source = source.into();
        Self {
            name: source.clone(),
            source,
            kind: EncodedKind::Numeric,
        }
    }

    pub fn indicator(source: impl Into<String>, category: impl Into<String>) -> Self {
        let source = source.into();
        let category = category.into();
        Self {
            name: format!("{source}_{category}"),
            source,
            kind: EncodedKind::Indicator { category },
        }
    }

    #[inline]
    pub fn is_indicator(&self) -> bool {
        matches!(self.kind, EncodedKind::Indicator { .. })
    }
}

/// Encoded feature matrix.
///
/// # Storage Layout
///
/// Values are stored **feature-major**: `[n_features, n_samples]`, so each
/// column's values across all samples are contiguous. Tree building sorts
/// samples one feature at a time and benefits from this layout.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodedMatrix {
    columns: Vec<EncodedColumn>,
    index: Vec<usize>,
    features: Array2<f64>,
}

impl EncodedMatrix {
    /// Create a matrix from feature-major values.
    ///
    /// # Errors
    ///
    /// - [`EncodingError::ShapeMismatch`] if the array shape disagrees with
    ///   the column list or the row index
    /// - [`EncodingError::DuplicateColumn`] if two columns share a name
    pub fn new(
        columns: Vec<EncodedColumn>,
        index: Vec<usize>,
        features: Array2<f64>,
    ) -> Result<Self, EncodingError> {
        let expected = (columns.len(), index.len());
        if features.dim() != expected {
            return Err(EncodingError::ShapeMismatch {
                expected,
                got: features.dim(),
            });
        }
        let mut seen = HashSet::with_capacity(columns.len());
        for col in &columns {
            if !seen.insert(col.name.as_str()) {
                return Err(EncodingError::DuplicateColumn(col.name.clone()));
            }
        }
        Ok(Self {
            columns,
            index,
            features,
        })
    }

    #[inline]
    pub fn n_samples(&self) -> usize {
        self.features.ncols()
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.features.nrows()
    }

    #[inline]
    pub fn columns(&self) -> &[EncodedColumn] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Row identities, in sample order.
    #[inline]
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    /// Feature-major view: `[n_features, n_samples]`.
    #[inline]
    pub fn features(&self) -> ArrayView2<'_, f64> {
        self.features.view()
    }

    /// Values of one encoded column across all samples.
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .map(|i| self.features.row(i))
    }

    /// Gather samples by position into a new matrix.
    ///
    /// # Panics
    ///
    /// Panics if a position is out of bounds.
    pub fn select_rows(&self, positions: &[usize]) -> EncodedMatrix {
        EncodedMatrix {
            columns: self.columns.clone(),
            index: positions.iter().map(|&p| self.index[p]).collect(),
            features: self.features.select(Axis(1), positions),
        }
    }
}
