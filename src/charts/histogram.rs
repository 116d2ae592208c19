use plotters::coord::Shift;
use plotters::prelude::*;

use super::{Chart, DrawResult, FONT};
use crate::color::accent;
use crate::stats::{self, Bin};

const KDE_POINTS: usize = 200;

/// Histogram of one numeric column with a density curve scaled to counts.
pub struct DistributionChart {
    column: String,
    bins: Vec<Bin>,
    density: Vec<(f64, f64)>,
}

impl DistributionChart {
    /// `None` when the column has no finite values.
    pub fn new(column: &str, values: &[f64], bins: usize) -> Option<Self> {
        let values: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let bins = stats::histogram(&values, bins);
        let first = bins.first()?;
        let width = first.hi - first.lo;
        let scale = values.len() as f64 * width;
        let density = stats::gaussian_kde(&values, KDE_POINTS)
            .into_iter()
            .map(|(x, d)| (x, d * scale))
            .collect();
        Some(DistributionChart {
            column: column.to_string(),
            bins,
            density,
        })
    }
}

impl Chart for DistributionChart {
    fn file_stem(&self) -> String {
        format!("{}_distribution", self.column)
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> DrawResult<DB> {
        let (Some(first), Some(last)) = (self.bins.first(), self.bins.last()) else {
            return Ok(());
        };
        let peak = self
            .bins
            .iter()
            .map(|b| b.count as f64)
            .chain(self.density.iter().map(|(_, d)| *d))
            .fold(1.0, f64::max);

        let mut chart = ChartBuilder::on(root)
            .caption(format!("Distribution of {}", self.column), (FONT, 22))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(55)
            .build_cartesian_2d(first.lo..last.hi, 0f64..peak * 1.1)?;

        chart
            .configure_mesh()
            .x_desc(self.column.as_str())
            .y_desc("Count")
            .draw()?;

        let color = accent();
        chart.draw_series(self.bins.iter().map(|b| {
            Rectangle::new([(b.lo, 0.0), (b.hi, b.count as f64)], color.mix(0.7).filled())
        }))?;
        chart.draw_series(self.bins.iter().map(|b| {
            Rectangle::new([(b.lo, 0.0), (b.hi, b.count as f64)], WHITE.stroke_width(1))
        }))?;

        if !self.density.is_empty() {
            chart.draw_series(LineSeries::new(
                self.density.iter().copied(),
                color.stroke_width(2),
            ))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_values_are_left_out() {
        let chart = DistributionChart::new("price", &[f64::INFINITY, 3.5, 2.0], 40).unwrap();
        assert_eq!(chart.bins.iter().map(|b| b.count).sum::<usize>(), 2);
        assert!(chart.bins.iter().all(|b| b.lo.is_finite() && b.hi.is_finite()));
        assert!(chart.density.iter().all(|(x, d)| x.is_finite() && d.is_finite()));
        assert!(DistributionChart::new("price", &[f64::NEG_INFINITY], 40).is_none());
    }
}
