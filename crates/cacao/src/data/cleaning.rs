//! Normalization of the raw review table into the clean schema.
//!
//! The raw file stores every field as text. Cleaning:
//!
//! - drops the `REF` column
//! - parses `review_year`, `cocoa_percent` (`"70%"` → `0.70`) and `Rating`
//! - collapses `bean_type` into a [`BeanType`]
//! - recodes `bean_origin`, folding multi-origin entries into `"multi"`
//! - trims surrounding whitespace (including U+00A0) from remaining text columns

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::columns::{
    BAR_ORIGIN, BEAN_ORIGIN, BEAN_TYPE, COCOA_PERCENT, COMPANY, COMPANY_LOCATION, RATING, REF,
    REVIEW_YEAR,
};
use super::error::TableError;
use super::table::{Column, ColumnData, Table};

/// Placeholder for missing or blank categorical values.
pub const UNKNOWN: &str = "unknown";
/// Label for entries naming more than one origin.
pub const MULTI_ORIGIN: &str = "multi";
/// Label for rare categories.
pub const OTHER: &str = "other";

// =============================================================================
// Errors
// =============================================================================

/// Errors raised while cleaning a raw table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CleanError {
    #[error(transparent)]
    Table(#[from] TableError),

    /// A numeric field could not be parsed.
    #[error("cannot parse `{value}` in column `{column}` at row {row}")]
    Parse {
        column: String,
        row: usize,
        value: String,
    },
}

// =============================================================================
// Bean type
// =============================================================================

/// Collapsed bean variety.
///
/// The raw column holds free text such as `"Criollo (Porcelana)"` or
/// `"Trinitario, Criollo"`; [`BeanType::collapse`] maps it onto this fixed set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeanType {
    Unknown,
    Blend,
    Forasetero,
    Criollo,
    Trinitario,
    Other,
}

impl BeanType {
    /// Map a raw bean-type string onto its collapsed label.
    ///
    /// Rules, first match wins (case-insensitive substring tests):
    /// 1. blank or `"unknown"` → `Unknown`
    /// 2. `"blend"`, or Forastero together with Criollo or Trinitario → `Blend`
    /// 3. Forastero → `Forasetero`
    /// 4. Criollo → `Criollo`
    /// 5. Trinitario → `Trinitario`
    /// 6. anything else → `Other`
    ///
    /// Both the `forastero` spelling and the `forasetero` misspelling count as
    /// Forastero.
    ///
    /// # Example
    ///
    /// ```
    /// use cacao::data::BeanType;
    ///
    /// assert_eq!(BeanType::collapse("\u{a0}"), BeanType::Unknown);
    /// assert_eq!(BeanType::collapse("Criollo (Porcelana)"), BeanType::Criollo);
    /// assert_eq!(BeanType::collapse("Forastero, Trinitario"), BeanType::Blend);
    /// assert_eq!(BeanType::collapse("Nacional"), BeanType::Other);
    /// ```
    pub fn collapse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == UNKNOWN {
            return BeanType::Unknown;
        }

        let lower = trimmed.to_lowercase();
        let forastero = lower.contains("forastero") || lower.contains("forasetero");
        let criollo = lower.contains("criollo");
        let trinitario = lower.contains("trinitario");

        if lower.contains("blend") || (forastero && (criollo || trinitario)) {
            BeanType::Blend
        } else if forastero {
            BeanType::Forasetero
        } else if criollo {
            BeanType::Criollo
        } else if trinitario {
            BeanType::Trinitario
        } else {
            BeanType::Other
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BeanType::Unknown => "unknown",
            BeanType::Blend => "blend",
            BeanType::Forasetero => "forasetero",
            BeanType::Criollo => "criollo",
            BeanType::Trinitario => "trinitario",
            BeanType::Other => "other",
        }
    }
}

impl fmt::Display for BeanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Bean origin
// =============================================================================

/// Recode broad bean origins.
///
/// Blank entries become `"unknown"`, entries listing several origins
/// (containing `,` or `/`) become `"multi"`. With `rare_threshold = Some(n)`,
/// categories seen `n` times or fewer after that recoding become `"other"`.
pub fn recode_bean_origin(values: &[String], rare_threshold: Option<usize>) -> Vec<String> {
    let recoded: Vec<String> = values
        .iter()
        .map(|raw| {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                UNKNOWN.to_string()
            } else if trimmed.contains(',') || trimmed.contains('/') {
                MULTI_ORIGIN.to_string()
            } else {
                trimmed.to_string()
            }
        })
        .collect();

    match rare_threshold {
        None => recoded,
        Some(threshold) => collapse_rare(recoded, threshold),
    }
}

fn collapse_rare(values: Vec<String>, threshold: usize) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in &values {
        *counts.entry(v.as_str()).or_default() += 1;
    }
    let keep: Vec<bool> = values.iter().map(|v| counts[v.as_str()] > threshold).collect();
    values
        .into_iter()
        .zip(keep)
        .map(|(v, keep)| if keep { v } else { OTHER.to_string() })
        .collect()
}

// =============================================================================
// Numeric fields
// =============================================================================

/// Parse a cocoa percentage such as `"70%"` into a fraction (`0.70`).
///
/// Returns `None` if the text is not a number.
pub fn parse_cocoa_percent(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
    number.parse::<f64>().ok().map(|v| v / 100.0)
}

// =============================================================================
// Table cleaning
// =============================================================================

/// Options for [`clean`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Fold bean origins seen at most this many times into `"other"`.
    /// `None` keeps every origin.
    pub rare_origin_threshold: Option<usize>,
}

/// Turn a raw (all-text) review table into the clean schema.
///
/// Columns that are already numeric are left as they are. The input is not
/// modified.
///
/// # Errors
///
/// - [`CleanError::Table`] if a required column is missing
/// - [`CleanError::Parse`] if a numeric field does not parse
pub fn clean(raw: &Table, config: &CleaningConfig) -> Result<Table, CleanError> {
    let mut table = raw.clone();
    if table.column(REF).is_some() {
        table.drop_column(REF)?;
    }

    parse_numeric(&mut table, REVIEW_YEAR, |s| s.trim().parse().ok())?;
    parse_numeric(&mut table, COCOA_PERCENT, parse_cocoa_percent)?;
    parse_numeric(&mut table, RATING, |s| s.trim().parse().ok())?;

    let bean_type = categorical(&table, BEAN_TYPE)?
        .iter()
        .map(|raw| BeanType::collapse(raw).as_str())
        .collect::<Vec<_>>();
    table.replace_column(Column::categorical(BEAN_TYPE, bean_type))?;

    let origin = recode_bean_origin(categorical(&table, BEAN_ORIGIN)?, config.rare_origin_threshold);
    table.replace_column(Column::categorical(BEAN_ORIGIN, origin))?;

    for name in [COMPANY, BAR_ORIGIN, COMPANY_LOCATION] {
        if let Some(values) = table.column(name).and_then(Column::as_categorical) {
            let trimmed: Vec<String> = values.iter().map(|v| v.trim().to_string()).collect();
            table.replace_column(Column::categorical(name, trimmed))?;
        }
    }

    Ok(table)
}

fn categorical<'a>(table: &'a Table, name: &str) -> Result<&'a [String], CleanError> {
    let column = table
        .column(name)
        .ok_or_else(|| TableError::MissingColumn(name.to_string()))?;
    match column.data() {
        ColumnData::Categorical(values) => Ok(values),
        ColumnData::Numeric(_) => Err(TableError::NotCategorical(name.to_string()).into()),
    }
}

fn parse_numeric(
    table: &mut Table,
    name: &str,
    parse: impl Fn(&str) -> Option<f64>,
) -> Result<(), CleanError> {
    let column = table
        .column(name)
        .ok_or_else(|| TableError::MissingColumn(name.to_string()))?;
    let Some(raw) = column.as_categorical() else {
        return Ok(());
    };

    let values = raw
        .iter()
        .enumerate()
        .map(|(row, value)| {
            parse(value).ok_or_else(|| CleanError::Parse {
                column: name.to_string(),
                row,
                value: value.clone(),
            })
        })
        .collect::<Result<Vec<f64>, _>>()?;

    table.replace_column(Column::numeric(name, values))?;
    Ok(())
}
