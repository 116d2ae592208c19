//! Chart rendering.
//!
//! Every chart implements [`Chart`] once, generically over the plotters
//! backend, and [`render`] picks SVG or PNG at the edge. SVG is the default:
//! it carries axis text without needing system fonts and is byte-stable
//! between runs.
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use log::debug;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::EdaError;

mod bars;
mod boxplot;
mod heatmap;
mod histogram;
mod scatter;

pub use bars::{CategoryBars, RatingCounts};
pub use boxplot::RatingBoxplot;
pub use heatmap::CorrelationHeatmap;
pub use histogram::DistributionChart;
pub use scatter::PriceRatingScatter;

pub(crate) type DrawResult<DB> = Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

pub(crate) const FONT: &str = "sans-serif";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ChartFormat {
    #[default]
    Svg,
    Png,
}

impl ChartFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ChartFormat::Svg => "svg",
            ChartFormat::Png => "png",
        }
    }
}

/// A figure that can draw itself onto any plotters backend.
pub trait Chart {
    /// File name without extension.
    fn file_stem(&self) -> String;

    fn size(&self) -> (u32, u32) {
        (800, 500)
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> DrawResult<DB>;
}

/// Render `chart` into `dir`, returning the written path.
pub fn render<C: Chart>(chart: &C, dir: &Path, format: ChartFormat) -> Result<PathBuf, EdaError> {
    let path = dir.join(format!("{}.{}", chart.file_stem(), format.extension()));
    let result = match format {
        ChartFormat::Svg => paint(chart, &SVGBackend::new(&path, chart.size()).into_drawing_area()),
        ChartFormat::Png => paint(chart, &BitMapBackend::new(&path, chart.size()).into_drawing_area()),
    };
    result.map_err(|message| EdaError::Chart {
        path: path.clone(),
        message,
    })?;
    debug!("rendered {}", path.display());
    Ok(path)
}

fn paint<C: Chart, DB: DrawingBackend>(chart: &C, root: &DrawingArea<DB, Shift>) -> Result<(), String> {
    root.fill(&WHITE).map_err(|e| e.to_string())?;
    chart.draw(root).map_err(|e| e.to_string())?;
    root.present().map_err(|e| e.to_string())
}

/// Segment boundary for category `i` of `count`. The closing edge of the
/// last category is the end of the axis.
pub(crate) fn segment_edge(i: usize, count: usize) -> SegmentValue<i32> {
    if i >= count {
        SegmentValue::Last
    } else {
        SegmentValue::Exact(i as i32)
    }
}

/// Label for a category axis position, blank between categories.
pub(crate) fn segment_label(labels: &[String], value: &SegmentValue<i32>) -> String {
    match value {
        SegmentValue::CenterOf(i) => usize::try_from(*i)
            .ok()
            .and_then(|i| labels.get(i))
            .cloned()
            .unwrap_or_default(),
        _ => String::new(),
    }
}

/// `[lo, hi]` padded by 5% (or ±0.5 for a flat range) so marks don't sit on
/// the frame.
pub(crate) fn padded_range(values: impl IntoIterator<Item = f64>) -> Option<std::ops::Range<f64>> {
    let (lo, hi) = values
        .into_iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() || !hi.is_finite() {
        return None;
    }
    let pad = if hi > lo { (hi - lo) * 0.05 } else { 0.5 };
    Some(lo - pad..hi + pad)
}

/// Format a rating the way it reads in the data: `4`, `3.5`.
pub(crate) fn rating_label(rating: f64) -> String {
    format!("{rating}")
}

/// Distinct ratings in ascending order, each with the `y` values of its rows.
pub(crate) fn group_by_rating(ratings: &[Option<f64>], ys: &[Option<f64>]) -> Vec<(f64, Vec<f64>)> {
    let mut groups: Vec<(f64, Vec<f64>)> = Vec::new();
    for (r, y) in ratings.iter().zip(ys) {
        let (Some(r), Some(y)) = (r, y) else {
            continue;
        };
        match groups.iter_mut().find(|(key, _)| key == r) {
            Some((_, values)) => values.push(*y),
            None => groups.push((*r, vec![*y])),
        }
    }
    groups.sort_by(|a, b| a.0.total_cmp(&b.0));
    groups
}
