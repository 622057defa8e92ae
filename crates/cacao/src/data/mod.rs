//! Tabular data: the review table, the feature/label splitter, and the
//! upstream loading and cleaning steps.
//!
//! # Key Types
//!
//! - [`Table`]: ordered named columns sharing a row index
//! - [`Column`]: numeric or categorical column
//! - [`Target`]: target vector aligned with a feature table
//!
//! # Pipeline
//!
//! [`load_csv`] → [`clean`] → [`split_features_labels`]
//!
//! Missing numeric values are `f64::NAN`. Missing categorical values are
//! blank strings until cleaning replaces them.

pub mod cleaning;
pub mod columns;
mod error;
mod io;
mod split;
mod table;

pub use cleaning::{clean, BeanType, CleanError, CleaningConfig};
pub use error::TableError;
pub use io::{load_clean, load_csv, normalize_header, read_csv, LoadError};
pub use split::{join_features_labels, split_features_labels, Target};
pub use table::{Column, ColumnData, ColumnKind, Table};
