//! Cleaning steps applied between loading and analysis.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info};
use serde::Serialize;

use crate::data::loader::is_missing;
use crate::data::model::{ColumnKind, Dataset, Value};
use crate::stats;

/// Columns parsed as calendar dates when present.
pub const DATE_COLUMNS: [&str; 3] = ["order_date", "ship_date", "review_date"];

/// Columns forced to numbers when present.
pub const NUMERIC_COLUMNS: [&str; 5] = ["price", "total_amount", "quantity", "shipping_cost", "rating"];

/// Fill value for missing categorical cells.
pub const MISSING_TEXT: &str = "Unknown";

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Missing-cell counts for columns with at least one gap, largest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MissingReport {
    pub columns: Vec<(String, usize)>,
}

impl MissingReport {
    pub fn total(&self) -> usize {
        self.columns.iter().map(|(_, n)| n).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImputedColumn {
    pub column: String,
    pub filled: usize,
    pub fill: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleaningReport {
    pub rows_before: usize,
    pub duplicates_removed: usize,
    pub coerced_to_missing: usize,
    pub unparsed_dates: usize,
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

pub fn missing_report(dataset: &Dataset) -> MissingReport {
    let mut columns: Vec<(String, usize)> = dataset
        .columns()
        .iter()
        .map(|c| (c.name.clone(), c.null_count()))
        .filter(|(_, n)| *n > 0)
        .collect();
    // stable sort keeps column order among equal counts
    columns.sort_by(|a, b| b.1.cmp(&a.1));
    MissingReport { columns }
}

/// Drop exact duplicate rows, keeping the first occurrence.
pub fn drop_duplicates(dataset: &mut Dataset) -> usize {
    let keep: Vec<bool> = {
        let mut seen = HashSet::with_capacity(dataset.len());
        (0..dataset.len()).map(|i| seen.insert(dataset.row(i))).collect()
    };
    let removed = keep.iter().filter(|k| !**k).count();
    if removed > 0 {
        dataset.retain_rows(&keep);
    }
    removed
}

/// Trim surrounding whitespace from every string cell.
pub fn strip_text(dataset: &mut Dataset) {
    for column in dataset.columns_mut() {
        for value in &mut column.values {
            if let Value::String(s) = value {
                let trimmed = s.trim();
                if trimmed.len() != s.len() {
                    *s = trimmed.to_string();
                }
            }
        }
    }
}

/// Force the named columns to floats. Returns how many present cells could
/// not be read as numbers and became missing.
pub fn coerce_numeric(dataset: &mut Dataset, columns: &[&str]) -> usize {
    let mut coerced = 0;
    for name in columns {
        let Some(column) = dataset.column_mut(name) else {
            continue;
        };
        for value in &mut column.values {
            let number = match value {
                Value::Integer(i) => Some(*i as f64),
                Value::Float(f) => Some(*f).filter(|v| v.is_finite()),
                Value::String(s) => parse_number(s),
                Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
                Value::Date(_) => None,
                Value::Null => continue,
            };
            *value = match number {
                Some(n) => Value::Float(n),
                None => {
                    coerced += 1;
                    Value::Null
                }
            };
        }
    }
    coerced
}

fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if is_missing(s) {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Convert the named columns to dates. Returns how many present cells could
/// not be parsed and became missing.
pub fn parse_dates(dataset: &mut Dataset, columns: &[&str]) -> usize {
    let mut unparsed = 0;
    for name in columns {
        let Some(column) = dataset.column_mut(name) else {
            continue;
        };
        for value in &mut column.values {
            let date = match value {
                Value::Date(d) => Some(*d),
                Value::String(s) => parse_date(s),
                Value::Null => continue,
                _ => None,
            };
            *value = match date {
                Some(d) => Value::Date(d),
                None => {
                    unparsed += 1;
                    Value::Null
                }
            };
        }
    }
    unparsed
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Fill numeric gaps with the column median and text gaps with
/// [`MISSING_TEXT`]. Columns without any observed value, booleans and dates
/// are left as they are.
pub fn impute_missing(dataset: &mut Dataset) -> Vec<ImputedColumn> {
    let mut imputed = Vec::new();
    for column in dataset.columns_mut() {
        if column.null_count() == 0 {
            continue;
        }
        let fill = match column.kind() {
            ColumnKind::Integer | ColumnKind::Float => {
                let Some(median) = stats::median(&column.numeric_values()) else {
                    continue;
                };
                if column.kind() == ColumnKind::Integer && median.fract() == 0.0 {
                    Value::Integer(median as i64)
                } else {
                    Value::Float(median)
                }
            }
            ColumnKind::Text => Value::String(MISSING_TEXT.to_string()),
            ColumnKind::Bool | ColumnKind::Date | ColumnKind::Empty => continue,
        };
        let filled = column.fill_nulls(&fill);
        debug!("imputed {filled} cells of '{}' with {fill}", column.name);
        imputed.push(ImputedColumn {
            column: column.name.clone(),
            filled,
            fill: fill.to_field(),
        });
    }
    imputed
}

/// Run the fixed cleaning sequence: deduplicate, strip text, coerce the
/// known numeric columns, parse the known date columns.
pub fn clean(dataset: &mut Dataset) -> CleaningReport {
    let rows_before = dataset.len();
    let duplicates_removed = drop_duplicates(dataset);
    strip_text(dataset);
    let coerced_to_missing = coerce_numeric(dataset, &NUMERIC_COLUMNS);
    let unparsed_dates = parse_dates(dataset, &DATE_COLUMNS);

    info!(
        "cleaned {rows_before} rows: {duplicates_removed} duplicates dropped, \
         {coerced_to_missing} non-numeric cells and {unparsed_dates} bad dates set missing"
    );

    CleaningReport {
        rows_before,
        duplicates_removed,
        coerced_to_missing,
        unparsed_dates,
    }
}
