//! Derived tables on disk and the human-readable console summary.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::clean::{ImputedColumn, MissingReport};
use crate::data::model::Dataset;
use crate::stats::{CorrelationMatrix, Description, Highlights, ProductAggregate};

const DESCRIBE_ROWS: [&str; 11] = [
    "count", "unique", "top", "freq", "mean", "std", "min", "25%", "50%", "75%", "max",
];

fn num(v: Option<f64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

fn csv_writer(path: &Path) -> Result<csv::Writer<std::fs::File>> {
    csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))
}

// ---------------------------------------------------------------------------
// Derived tables
// ---------------------------------------------------------------------------

/// One row per statistic, one column per dataset column. Cells that don't
/// apply to a column's type are blank.
pub fn write_description(description: &Description, path: &Path) -> Result<()> {
    let mut writer = csv_writer(path)?;
    let mut header = vec![String::new()];
    header.extend(description.order.iter().cloned());
    writer.write_record(&header)?;

    for stat in DESCRIBE_ROWS {
        let mut row = vec![stat.to_string()];
        for name in &description.order {
            let cell = if let Some(n) = description.numeric.iter().find(|s| &s.column == name) {
                match stat {
                    "count" => n.count.to_string(),
                    "mean" => num(n.mean),
                    "std" => num(n.std),
                    "min" => num(n.min),
                    "25%" => num(n.q25),
                    "50%" => num(n.q50),
                    "75%" => num(n.q75),
                    "max" => num(n.max),
                    _ => String::new(),
                }
            } else if let Some(c) = description.categorical.iter().find(|s| &s.column == name) {
                match stat {
                    "count" => c.count.to_string(),
                    "unique" => c.unique.to_string(),
                    "top" => c.top.clone().unwrap_or_default(),
                    "freq" => c.freq.to_string(),
                    _ => String::new(),
                }
            } else {
                String::new()
            };
            row.push(cell);
        }
        writer.write_record(&row)?;
    }
    writer.flush().context("flushing description")?;
    Ok(())
}

/// The numeric part of the description, one row per column.
pub fn write_numeric_summary(description: &Description, path: &Path) -> Result<()> {
    let mut writer = csv_writer(path)?;
    writer.write_record(["column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"])?;
    for s in &description.numeric {
        writer.write_record([
            s.column.clone(),
            s.count.to_string(),
            num(s.mean),
            num(s.std),
            num(s.min),
            num(s.q25),
            num(s.q50),
            num(s.q75),
            num(s.max),
        ])?;
    }
    writer.flush().context("flushing numeric summary")?;
    Ok(())
}

pub fn write_correlation(matrix: &CorrelationMatrix, path: &Path) -> Result<()> {
    let mut writer = csv_writer(path)?;
    let mut header = vec![String::new()];
    header.extend(matrix.columns.iter().cloned());
    writer.write_record(&header)?;
    for (name, row) in matrix.columns.iter().zip(&matrix.values) {
        let mut record = vec![name.clone()];
        record.extend(row.iter().map(|r| num(*r)));
        writer.write_record(&record)?;
    }
    writer.flush().context("flushing correlation matrix")?;
    Ok(())
}

pub fn write_top_products(products: &[ProductAggregate], path: &Path) -> Result<()> {
    let mut writer = csv_writer(path)?;
    writer.write_record(["product_id", "total_revenue", "total_qty", "avg_rating"])?;
    for p in products {
        writer.write_record([
            p.product_id.clone(),
            p.total_revenue.to_string(),
            num(p.total_qty),
            num(p.avg_rating),
        ])?;
    }
    writer.flush().context("flushing top products")?;
    Ok(())
}

pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serializing summary")?;
    std::fs::write(path, text + "\n").with_context(|| format!("writing {}", path.display()))
}

// ---------------------------------------------------------------------------
// Console
// ---------------------------------------------------------------------------

fn fmt2(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".to_string())
}

pub fn dataset_overview(dataset: &Dataset) -> String {
    let (rows, cols) = dataset.shape();
    let mut out = String::new();
    let _ = writeln!(out, "Dataset shape: ({rows}, {cols})");
    let _ = writeln!(out, "Columns:");
    for column in dataset.columns() {
        let _ = writeln!(out, "  {:<24} {}", column.name, column.kind());
    }
    out
}

pub fn missing_overview(report: &MissingReport, imputed: &[ImputedColumn]) -> String {
    let mut out = String::new();
    if report.is_empty() {
        let _ = writeln!(out, "Missing values: none");
    } else {
        let _ = writeln!(out, "Missing values ({} cells):", report.total());
        for (column, n) in &report.columns {
            let _ = writeln!(out, "  {column:<24} {n}");
        }
    }
    for fill in imputed {
        let _ = writeln!(out, "  filled {} cells of {} with {}", fill.filled, fill.column, fill.fill);
    }
    out
}

pub fn description_overview(description: &Description) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<24} {:>8} {:>12} {:>12} {:>12} {:>12} {:>12}",
        "column", "count", "mean", "std", "min", "50%", "max"
    );
    for s in &description.numeric {
        let _ = writeln!(
            out,
            "{:<24} {:>8} {:>12} {:>12} {:>12} {:>12} {:>12}",
            s.column,
            s.count,
            fmt2(s.mean),
            fmt2(s.std),
            fmt2(s.min),
            fmt2(s.q50),
            fmt2(s.max)
        );
    }
    for c in &description.categorical {
        let _ = writeln!(
            out,
            "{:<24} {:>8} unique={} top={} ({})",
            c.column,
            c.count,
            c.unique,
            c.top.as_deref().unwrap_or("-"),
            c.freq
        );
    }
    out
}

pub fn highlights_overview(highlights: &Highlights) -> String {
    let mut out = String::new();
    if let Some(r) = &highlights.rating {
        let _ = writeln!(
            out,
            "Rating: mean {:.2}, median {:.2} over {} reviews",
            r.mean, r.median, r.count
        );
    }
    if let Some(p) = &highlights.price {
        let _ = writeln!(
            out,
            "Price: min {}, median {}, mean {}, max {}",
            fmt2(p.min),
            fmt2(p.q50),
            fmt2(p.mean),
            fmt2(p.max)
        );
    }
    if !highlights.top_categories.is_empty() {
        let _ = writeln!(out, "Top categories:");
        for (category, n) in &highlights.top_categories {
            let _ = writeln!(out, "  {category:<24} {n}");
        }
    }
    out
}
