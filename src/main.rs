use std::path::PathBuf;
use std::process::ExitCode;

use amazon_eda::charts::ChartFormat;
use amazon_eda::EdaConfig;
use anyhow::Result;
use clap::Parser;
use log::{error, info};

/// Clean, summarize and chart an Amazon orders/reviews table.
#[derive(Parser, Debug)]
#[command(name = "amazon-eda", version, about)]
struct Args {
    /// Dataset to analyze (.csv, .json or .parquet)
    input: Option<PathBuf>,

    /// JSON file with run settings; flags given here take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory receiving plots/ and data/
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Image format for charts
    #[arg(long, value_enum)]
    format: Option<ChartFormat>,

    /// Histogram bins per distribution chart
    #[arg(long)]
    bins: Option<usize>,

    /// Number of categories in the top-categories chart
    #[arg(long)]
    top_categories: Option<usize>,

    /// Maximum points in the price/rating scatter
    #[arg(long)]
    sample: Option<usize>,

    /// Seed for the scatter sample
    #[arg(long)]
    seed: Option<u64>,

    /// Also write the cleaned table as Parquet
    #[arg(long)]
    parquet: bool,
}

impl Args {
    fn into_config(self) -> Result<EdaConfig> {
        let mut config = match &self.config {
            Some(path) => EdaConfig::from_file(path)?,
            None => EdaConfig::default(),
        };
        if let Some(input) = self.input {
            config.data_path = input;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(format) = self.format {
            config.chart_format = format;
        }
        if let Some(bins) = self.bins {
            config.histogram_bins = bins;
        }
        if let Some(n) = self.top_categories {
            config.top_categories = n;
        }
        if let Some(n) = self.sample {
            config.scatter_sample = n;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config.write_parquet |= self.parquet;
        Ok(config)
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let result = Args::parse().into_config().and_then(|config| {
        info!("starting analysis of {}", config.data_path.display());
        let summary = amazon_eda::run(&config)?;
        info!(
            "done: {} charts in {}, {} tables in {}",
            summary.charts.len(),
            config.plots_dir().display(),
            summary.tables.len(),
            config.derived_dir().display()
        );
        Ok(())
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
