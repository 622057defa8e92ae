//! CSV loading for the raw review file.
//!
//! The published file uses multi-line headers (`"Review\nDate"`,
//! `"Company\u{a0}\n(Maker-if known)"`) whose line endings depend on the
//! platform that last saved it. Headers are normalized by collapsing every
//! whitespace run (including `\r\n` and U+00A0) into a single space before
//! being mapped onto the short schema names.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::cleaning::{clean, CleanError, CleaningConfig};
use super::columns::{
    BAR_ORIGIN, BEAN_ORIGIN, BEAN_TYPE, COCOA_PERCENT, COMPANY, COMPANY_LOCATION, RATING, REF,
    REVIEW_YEAR,
};
use super::error::TableError;
use super::table::{Column, Table};

/// Errors raised while loading a dataset.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Clean(#[from] CleanError),
}

/// Map a raw header onto its schema name. Unknown headers pass through
/// with normalized whitespace.
pub fn normalize_header(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let name = match collapsed.as_str() {
        "Company (Maker-if known)" => COMPANY,
        "Specific Bean Origin or Bar Name" => BAR_ORIGIN,
        "REF" => REF,
        "Review Date" => REVIEW_YEAR,
        "Cocoa Percent" => COCOA_PERCENT,
        "Company Location" => COMPANY_LOCATION,
        "Rating" => RATING,
        "Bean Type" => BEAN_TYPE,
        "Broad Bean Origin" => BEAN_ORIGIN,
        _ => return collapsed,
    };
    name.to_string()
}

/// Load the raw review CSV into an all-text [`Table`] indexed `0..n`.
pub fn load_csv(path: impl AsRef<Path>) -> Result<Table, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let table = read_csv(BufReader::new(file))?;
    tracing::info!(
        path = %path.display(),
        rows = table.n_rows(),
        columns = table.n_columns(),
        "loaded raw dataset"
    );
    Ok(table)
}

/// Load the review CSV and [`clean`] it.
pub fn load_clean(path: impl AsRef<Path>, config: &CleaningConfig) -> Result<Table, LoadError> {
    let raw = load_csv(path)?;
    let table = clean(&raw, config)?;
    tracing::debug!(columns = ?table.column_names(), "cleaned dataset");
    Ok(table)
}

/// Read raw review CSV data from any reader.
pub fn read_csv<R: Read>(reader: R) -> Result<Table, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();
    let mut values: Vec<Vec<String>> = vec![Vec::new(); headers.len()];

    for record in reader.records() {
        let record = record?;
        for (column, field) in values.iter_mut().zip(record.iter()) {
            column.push(field.to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(values)
        .map(|(name, values)| Column::categorical(name, values))
        .collect();
    Ok(Table::new(columns)?)
}
