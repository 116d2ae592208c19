//! The analysis pipeline: load → clean → engineer → analyze → visualize.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::Serialize;

use crate::charts::{
    self, CategoryBars, CorrelationHeatmap, DistributionChart, PriceRatingScatter,
    RatingBoxplot, RatingCounts,
};
use crate::clean::{self, CleaningReport, ImputedColumn, MissingReport};
use crate::config::EdaConfig;
use crate::data::loader::load_file;
use crate::data::model::{ColumnKind, Dataset};
use crate::data::writer;
use crate::features;
use crate::report;
use crate::stats::{self, CorrelationMatrix, Description, Highlights, ProductAggregate};

pub const CLEANED_CSV: &str = "cleaned_amazon.csv";
pub const CLEANED_PARQUET: &str = "cleaned_amazon.parquet";
pub const DESCRIPTION_CSV: &str = "dataset_description.csv";
pub const NUMERIC_SUMMARY_CSV: &str = "numeric_summary.csv";
pub const CORRELATION_CSV: &str = "correlation_matrix.csv";
pub const TOP_PRODUCTS_CSV: &str = "top_products_by_revenue.csv";
pub const SUMMARY_JSON: &str = "run_summary.json";

/// Everything a run learned, also written to `run_summary.json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub input: PathBuf,
    pub loaded_shape: (usize, usize),
    pub cleaned_shape: (usize, usize),
    pub column_kinds: Vec<(String, ColumnKind)>,
    pub missing: MissingReport,
    pub cleaning: CleaningReport,
    pub features: Vec<String>,
    pub imputed: Vec<ImputedColumn>,
    pub highlights: Highlights,
    pub top_products: Vec<ProductAggregate>,
    pub charts: Vec<PathBuf>,
    pub tables: Vec<PathBuf>,
}

/// Run the whole analysis once. The first failing step aborts the run.
pub fn run(config: &EdaConfig) -> Result<RunSummary> {
    let plots_dir = config.plots_dir();
    let derived_dir = config.derived_dir();
    fs::create_dir_all(&plots_dir).with_context(|| format!("creating {}", plots_dir.display()))?;
    fs::create_dir_all(&derived_dir)
        .with_context(|| format!("creating {}", derived_dir.display()))?;

    // Step 1: load
    info!("loading dataset from {}", config.data_path.display());
    let mut dataset = load_file(&config.data_path)
        .with_context(|| format!("loading {}", config.data_path.display()))?;
    let loaded_shape = dataset.shape();
    info!("loaded {} rows x {} columns", loaded_shape.0, loaded_shape.1);
    println!("{}", report::dataset_overview(&dataset));
    let missing = clean::missing_report(&dataset);

    // Step 2: clean and derive
    let cleaning = clean::clean(&mut dataset);
    let features = features::engineer(&mut dataset).context("engineering features")?;
    let imputed = clean::impute_missing(&mut dataset);
    println!("{}", report::missing_overview(&missing, &imputed));

    let mut tables = Vec::new();
    let cleaned_csv = derived_dir.join(CLEANED_CSV);
    writer::write_csv(&dataset, &cleaned_csv).context("saving cleaned dataset")?;
    info!("cleaned dataset saved at {}", cleaned_csv.display());
    tables.push(cleaned_csv);
    if config.write_parquet {
        let cleaned_parquet = derived_dir.join(CLEANED_PARQUET);
        writer::write_parquet(&dataset, &cleaned_parquet).context("saving cleaned parquet")?;
        tables.push(cleaned_parquet);
    }

    if config.preview_rows > 0 && !dataset.is_empty() {
        println!("{}", writer::preview(&dataset, config.preview_rows)?);
    }

    // Step 3: analyze
    let description = stats::describe(&dataset);
    let correlation = stats::correlation_matrix(&dataset);
    let highlights = stats::highlights(&dataset, config.top_categories);
    let top_products = stats::top_products_by_revenue(&dataset, config.top_products);
    println!("{}", report::description_overview(&description));
    println!("{}", report::highlights_overview(&highlights));

    tables.extend(write_tables(&derived_dir, &description, &correlation, &top_products)?);

    // Step 4: visualize
    let charts = render_charts(&dataset, &correlation, &highlights, config, &plots_dir)?;
    info!("{} charts saved in {}", charts.len(), plots_dir.display());

    let summary = RunSummary {
        input: config.data_path.clone(),
        loaded_shape,
        cleaned_shape: dataset.shape(),
        column_kinds: dataset
            .columns()
            .iter()
            .map(|c| (c.name.clone(), c.kind()))
            .collect(),
        missing,
        cleaning,
        features,
        imputed,
        highlights,
        top_products,
        charts,
        tables,
    };

    let summary_path = derived_dir.join(SUMMARY_JSON);
    report::write_json(&summary, &summary_path)?;
    info!("run summary saved at {}", summary_path.display());
    Ok(summary)
}

fn write_tables(
    dir: &Path,
    description: &Description,
    correlation: &CorrelationMatrix,
    top_products: &[ProductAggregate],
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    let path = dir.join(DESCRIPTION_CSV);
    report::write_description(description, &path)?;
    written.push(path);

    let path = dir.join(NUMERIC_SUMMARY_CSV);
    report::write_numeric_summary(description, &path)?;
    written.push(path);

    if correlation.columns.len() > 1 {
        let path = dir.join(CORRELATION_CSV);
        report::write_correlation(correlation, &path)?;
        written.push(path);
    }

    if !top_products.is_empty() {
        let path = dir.join(TOP_PRODUCTS_CSV);
        report::write_top_products(top_products, &path)?;
        written.push(path);
    }

    Ok(written)
}

fn render_charts(
    dataset: &Dataset,
    correlation: &CorrelationMatrix,
    highlights: &Highlights,
    config: &EdaConfig,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    let format = config.chart_format;
    let mut rendered = Vec::new();

    for column in dataset.numeric_columns().into_iter().take(config.histogram_columns) {
        if let Some(chart) =
            DistributionChart::new(&column.name, &column.numeric_values(), config.histogram_bins)
        {
            rendered.push(charts::render(&chart, dir, format)?);
        }
    }

    if let Some(chart) = CorrelationHeatmap::new(correlation) {
        rendered.push(charts::render(&chart, dir, format)?);
    }

    if let Some(chart) = CategoryBars::new(highlights.top_categories.clone()) {
        rendered.push(charts::render(&chart, dir, format)?);
    }

    if !dataset.has_column("rating") {
        warn!("no rating column, skipping the rating charts");
    }
    let rating = numeric_cells(dataset, "rating");
    if let Some(ratings) = &rating {
        let observed: Vec<f64> = ratings.iter().flatten().copied().collect();
        if let Some(chart) = RatingCounts::new(&observed) {
            rendered.push(charts::render(&chart, dir, format)?);
        }
    }

    if let (Some(ratings), Some(prices)) = (&rating, numeric_cells(dataset, "price")) {
        let points: Vec<(f64, f64)> = prices
            .iter()
            .zip(ratings)
            .filter_map(|(p, r)| Some(((*p)?, (*r)?)))
            .collect();
        let complete = points.len();
        if let Some(chart) = PriceRatingScatter::new(points, config.scatter_sample, config.seed) {
            debug!("price/rating scatter: {} of {complete} rows", chart.point_count());
            rendered.push(charts::render(&chart, dir, format)?);
        }
    }

    if let (Some(ratings), Some(lengths)) = (&rating, numeric_cells(dataset, "review_length")) {
        let groups = charts::group_by_rating(ratings, &lengths);
        if let Some(chart) = RatingBoxplot::new(groups) {
            rendered.push(charts::render(&chart, dir, format)?);
        }
    }

    Ok(rendered)
}

/// The column's cells as numbers, `None` where missing. `None` overall when
/// the column is absent or not numeric.
fn numeric_cells(dataset: &Dataset, name: &str) -> Option<Vec<Option<f64>>> {
    let column = dataset.column(name).filter(|c| c.is_numeric())?;
    Some(column.values.iter().map(|v| v.as_f64()).collect())
}
