use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::charts::ChartFormat;

/// Run settings. Every field has a default, so a config file only needs the
/// keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdaConfig {
    pub data_path: PathBuf,
    pub output_dir: PathBuf,
    pub chart_format: ChartFormat,
    /// Numeric columns that get a distribution chart, in column order.
    pub histogram_columns: usize,
    pub histogram_bins: usize,
    pub top_categories: usize,
    pub top_products: usize,
    /// Upper bound on points in the price/rating scatter.
    pub scatter_sample: usize,
    pub seed: u64,
    /// Also write the cleaned table as Parquet.
    pub write_parquet: bool,
    pub preview_rows: usize,
}

impl Default for EdaConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("Data").join("amazon_synthetic_large.csv"),
            output_dir: PathBuf::from("outputs"),
            chart_format: ChartFormat::Svg,
            histogram_columns: 6,
            histogram_bins: 40,
            top_categories: 10,
            top_products: 20,
            scatter_sample: 2000,
            seed: 42,
            write_parquet: false,
            preview_rows: 5,
        }
    }
}

impl EdaConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn plots_dir(&self) -> PathBuf {
        self.output_dir.join("plots")
    }

    pub fn derived_dir(&self) -> PathBuf {
        self.output_dir.join("data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eda.json");
        std::fs::write(&path, r#"{ "output_dir": "out", "chart_format": "png", "seed": 7 }"#).unwrap();

        let config = EdaConfig::from_file(&path).unwrap();
        assert_eq!(config.plots_dir(), PathBuf::from("out").join("plots"));
        assert_eq!(config.chart_format, ChartFormat::Png);
        assert_eq!(config.seed, 7);
        assert_eq!(config.histogram_bins, 40);
    }

    #[test]
    fn unknown_format_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eda.json");
        std::fs::write(&path, r#"{ "chart_format": "gif" }"#).unwrap();
        assert!(EdaConfig::from_file(&path).is_err());
    }
}
