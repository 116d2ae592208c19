use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, BooleanArray, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;

use super::loader::unix_epoch;
use super::model::{Column, ColumnKind, Dataset, Value};

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Write the dataset as CSV with a header row. Missing cells are empty.
pub fn write_csv(dataset: &Dataset, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer
        .write_record(dataset.column_names())
        .context("writing CSV header")?;
    for row in 0..dataset.len() {
        writer
            .write_record(dataset.row(row).iter().map(|v| v.to_field()))
            .with_context(|| format!("writing CSV row {row}"))?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Arrow / Parquet
// ---------------------------------------------------------------------------

/// Convert the dataset into a single Arrow record batch.
pub fn to_record_batch(dataset: &Dataset) -> Result<RecordBatch> {
    let mut fields = Vec::with_capacity(dataset.width());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(dataset.width());

    for column in dataset.columns() {
        let (data_type, array) = column_to_array(column);
        fields.push(Field::new(column.name.as_str(), data_type, true));
        arrays.push(array);
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).context("assembling record batch")
}

fn column_to_array(column: &Column) -> (DataType, ArrayRef) {
    let values = &column.values;
    match column.kind() {
        ColumnKind::Integer => (
            DataType::Int64,
            Arc::new(Int64Array::from(
                values
                    .iter()
                    .map(|v| match v {
                        Value::Integer(i) => Some(*i),
                        _ => None,
                    })
                    .collect::<Vec<_>>(),
            )),
        ),
        ColumnKind::Float => (
            DataType::Float64,
            Arc::new(Float64Array::from(
                values.iter().map(Value::as_f64).collect::<Vec<_>>(),
            )),
        ),
        ColumnKind::Bool => (
            DataType::Boolean,
            Arc::new(BooleanArray::from(
                values
                    .iter()
                    .map(|v| match v {
                        Value::Bool(b) => Some(*b),
                        _ => None,
                    })
                    .collect::<Vec<_>>(),
            )),
        ),
        ColumnKind::Date => (
            DataType::Date32,
            Arc::new(Date32Array::from(
                values
                    .iter()
                    .map(|v| {
                        v.as_date()
                            .map(|d| d.signed_duration_since(unix_epoch()).num_days() as i32)
                    })
                    .collect::<Vec<_>>(),
            )),
        ),
        ColumnKind::Text | ColumnKind::Empty => (
            DataType::Utf8,
            Arc::new(StringArray::from(
                values
                    .iter()
                    .map(|v| (!v.is_null()).then(|| v.to_field()))
                    .collect::<Vec<_>>(),
            )),
        ),
    }
}

/// Write the dataset as a Parquet file.
pub fn write_parquet(dataset: &Dataset, path: &Path) -> Result<()> {
    let batch = to_record_batch(dataset)?;
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

/// Render the first `rows` rows as a boxed text table.
pub fn preview(dataset: &Dataset, rows: usize) -> Result<String> {
    let batch = to_record_batch(dataset)?;
    let head = batch.slice(0, rows.min(batch.num_rows()));
    Ok(pretty_format_batches(&[head])
        .context("formatting preview")?
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_file;
    use chrono::NaiveDate;

    fn sample() -> Dataset {
        Dataset::from_columns(vec![
            Column::new("order_id", vec![Value::String("O-1".into()), Value::String("O-2".into())]),
            Column::new("quantity", vec![Value::Integer(2), Value::Null]),
            Column::new("price", vec![Value::Float(0.1), Value::Float(19.99)]),
            Column::new(
                "order_date",
                vec![Value::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()), Value::Null],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn csv_output_reloads_to_the_same_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_csv(&sample(), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("order_id,quantity,price,order_date\n"));
        assert!(text.contains("O-1,2,0.1,2024-03-01\n"));
        assert!(text.contains("O-2,,19.99,\n"));

        let reloaded = load_file(&path).unwrap();
        assert_eq!(reloaded.column("price"), sample().column("price"));
    }

    #[test]
    fn parquet_keeps_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.parquet");
        write_parquet(&sample(), &path).unwrap();

        let reloaded = load_file(&path).unwrap();
        assert_eq!(reloaded, sample());
    }

    #[test]
    fn preview_limits_rows() {
        let table = preview(&sample(), 1).unwrap();
        assert!(table.contains("O-1"));
        assert!(!table.contains("O-2"));
    }
}
