use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use arrow::util::display::array_value_to_string;
use chrono::{NaiveDate, TimeDelta};
use log::debug;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Column, Dataset, Value};
use crate::error::EdaError;

/// Cell contents that read as missing, following the usual CSV conventions.
const MISSING_TOKENS: [&str; 8] = ["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row plus one record per order/review
/// * `.json`    – `[{ "product_id": "...", "price": 12.5, ... }, ...]`
/// * `.parquet` – flat table of scalar columns
pub fn load_file(path: &Path) -> Result<Dataset> {
    if !path.exists() {
        return Err(EdaError::DatasetNotFound(path.to_path_buf()).into());
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(EdaError::UnsupportedFormat(other.to_string()).into()),
    }?;

    debug!(
        "loaded {} rows x {} columns from {}",
        dataset.len(),
        dataset.width(),
        path.display()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Read every cell as text, then settle each column's type in one pass so a
/// single stray value turns the whole column into text, not just one cell.
fn load_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        for (col_idx, cells) in raw.iter_mut().enumerate() {
            let cell = record.get(col_idx).unwrap_or("");
            cells.push((!is_missing(cell)).then(|| cell.to_string()));
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| Column::new(name, infer_column(cells)))
        .collect();

    Ok(Dataset::from_columns(columns)?)
}

pub(crate) fn is_missing(cell: &str) -> bool {
    MISSING_TOKENS.contains(&cell.trim())
}

/// Pick the narrowest type every present cell parses as.
fn infer_column(cells: Vec<Option<String>>) -> Vec<Value> {
    let present = || cells.iter().flatten();

    if present().all(|c| c.trim().parse::<i64>().is_ok()) {
        return cells
            .iter()
            .map(|c| c.as_ref().and_then(|c| c.trim().parse().ok()).map_or(Value::Null, Value::Integer))
            .collect();
    }
    if present().all(|c| c.trim().parse::<f64>().is_ok()) {
        return cells
            .iter()
            .map(|c| {
                c.as_ref()
                    .and_then(|c| c.trim().parse::<f64>().ok())
                    .filter(|v| v.is_finite())
                    .map_or(Value::Null, Value::Float)
            })
            .collect();
    }
    if present().all(|c| parse_bool(c).is_some()) {
        return cells
            .iter()
            .map(|c| c.as_deref().and_then(parse_bool).map_or(Value::Null, Value::Bool))
            .collect();
    }
    cells
        .into_iter()
        .map(|c| c.map_or(Value::Null, Value::String))
        .collect()
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "order_id": "O-1", "price": 19.99, "rating": 4, "category": "Books" },
///   ...
/// ]
/// ```
///
/// Columns appear in order of first appearance; keys absent from a record
/// are missing cells.
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut names: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !names.contains(key) {
                names.push(key.clone());
            }
        }
    }

    let columns = names
        .into_iter()
        .map(|name| {
            let values = records
                .iter()
                .map(|rec| rec.get(&name).map_or(Value::Null, json_to_value))
                .collect();
            Column::new(name, values)
        })
        .collect();

    Ok(Dataset::from_columns(columns)?)
}

fn json_to_value(val: &JsonValue) -> Value {
    match val {
        JsonValue::String(s) if is_missing(s) => Value::Null,
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Null => Value::Null,
        other => Value::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of scalar columns, such as our own cleaned output.
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut values: Vec<Vec<Value>> = vec![Vec::new(); names.len()];

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (col_idx, cells) in values.iter_mut().enumerate() {
            let array = batch.column(col_idx);
            for row in 0..batch.num_rows() {
                cells.push(
                    extract_value(array, row)
                        .with_context(|| format!("column '{}', row {row}", names[col_idx]))?,
                );
            }
        }
    }

    let columns = names
        .into_iter()
        .zip(values)
        .map(|(name, cells)| Column::new(name, cells))
        .collect();

    Ok(Dataset::from_columns(columns)?)
}

// -- Parquet / Arrow helpers --

/// Extract a single cell from an Arrow column at a given row.
fn extract_value(col: &Arc<dyn Array>, row: usize) -> Result<Value> {
    if col.is_null(row) {
        return Ok(Value::Null);
    }

    macro_rules! integer {
        ($t:ty) => {
            col.as_primitive_opt::<$t>()
                .map(|a| Value::Integer(a.value(row) as i64))
        };
    }

    let value = match col.data_type() {
        DataType::Utf8 => col.as_string_opt::<i32>().map(|s| text_value(s.value(row))),
        DataType::LargeUtf8 => col.as_string_opt::<i64>().map(|s| text_value(s.value(row))),
        DataType::Int8 => integer!(Int8Type),
        DataType::Int16 => integer!(Int16Type),
        DataType::Int32 => integer!(Int32Type),
        DataType::Int64 => integer!(Int64Type),
        DataType::UInt8 => integer!(UInt8Type),
        DataType::UInt16 => integer!(UInt16Type),
        DataType::UInt32 => integer!(UInt32Type),
        DataType::UInt64 => integer!(UInt64Type),
        DataType::Float32 => col
            .as_primitive_opt::<Float32Type>()
            .map(|a| float_value(a.value(row) as f64)),
        DataType::Float64 => col
            .as_primitive_opt::<Float64Type>()
            .map(|a| float_value(a.value(row))),
        DataType::Boolean => col.as_boolean_opt().map(|a| Value::Bool(a.value(row))),
        DataType::Date32 => col
            .as_primitive_opt::<arrow::datatypes::Date32Type>()
            .and_then(|a| days_to_date(a.value(row)))
            .map(Value::Date),
        _ => Some(Value::String(
            array_value_to_string(col.as_ref(), row).context("formatting arrow value")?,
        )),
    };

    value.with_context(|| format!("unexpected array layout for {:?}", col.data_type()))
}

fn text_value(s: &str) -> Value {
    if is_missing(s) {
        Value::Null
    } else {
        Value::String(s.to_string())
    }
}

/// NaN and infinities carry no usable magnitude; they load as missing.
fn float_value(v: f64) -> Value {
    if !v.is_finite() {
        Value::Null
    } else {
        Value::Float(v)
    }
}

pub(crate) fn unix_epoch() -> NaiveDate {
    NaiveDate::default()
}

pub(crate) fn days_to_date(days: i32) -> Option<NaiveDate> {
    unix_epoch().checked_add_signed(TimeDelta::try_days(days as i64)?)
}
