use plotters::coord::Shift;
use plotters::prelude::*;

use super::{rating_label, segment_edge, segment_label, Chart, DrawResult, FONT};
use crate::color::{accent, generate_palette};

/// Horizontal bars for the most frequent categories, largest on top.
pub struct CategoryBars {
    counts: Vec<(String, usize)>,
}

impl CategoryBars {
    pub fn new(counts: Vec<(String, usize)>) -> Option<Self> {
        (!counts.is_empty()).then_some(CategoryBars { counts })
    }
}

impl Chart for CategoryBars {
    fn file_stem(&self) -> String {
        "top_categories".to_string()
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> DrawResult<DB> {
        let n = self.counts.len();
        let labels: Vec<String> = self.counts.iter().rev().map(|(c, _)| c.clone()).collect();
        let axis = |v: &SegmentValue<i32>| segment_label(&labels, v);
        let peak = self.counts.iter().map(|(_, c)| *c).max().unwrap_or(1) as f64;

        let mut chart = ChartBuilder::on(root)
            .caption(format!("Top {n} Product Categories"), (FONT, 22))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(140)
            .build_cartesian_2d(0f64..peak * 1.1, (0..n as i32 - 1).into_segmented())?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(n)
            .y_label_formatter(&axis)
            .x_desc("Orders")
            .draw()?;

        let palette = generate_palette(n);
        chart.draw_series(self.counts.iter().enumerate().map(|(i, (_, count))| {
            let slot = n - 1 - i;
            Rectangle::new(
                [(0.0, segment_edge(slot, n)), (*count as f64, segment_edge(slot + 1, n))],
                palette[i].filled(),
            )
        }))?;
        Ok(())
    }
}

/// Number of reviews per rating value.
pub struct RatingCounts {
    counts: Vec<(f64, usize)>,
}

impl RatingCounts {
    /// `ratings` are the observed (non-missing) rating values.
    pub fn new(ratings: &[f64]) -> Option<Self> {
        let mut counts: Vec<(f64, usize)> = Vec::new();
        for &r in ratings {
            match counts.iter_mut().find(|(key, _)| *key == r) {
                Some((_, n)) => *n += 1,
                None => counts.push((r, 1)),
            }
        }
        counts.sort_by(|a, b| a.0.total_cmp(&b.0));
        (!counts.is_empty()).then_some(RatingCounts { counts })
    }
}

impl Chart for RatingCounts {
    fn file_stem(&self) -> String {
        "rating_distribution".to_string()
    }

    fn size(&self) -> (u32, u32) {
        (600, 400)
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> DrawResult<DB> {
        let n = self.counts.len();
        let labels: Vec<String> = self.counts.iter().map(|(r, _)| rating_label(*r)).collect();
        let axis = |v: &SegmentValue<i32>| segment_label(&labels, v);
        let peak = self.counts.iter().map(|(_, c)| *c).max().unwrap_or(1) as f64;

        let mut chart = ChartBuilder::on(root)
            .caption("Rating Distribution", (FONT, 22))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(55)
            .build_cartesian_2d((0..n as i32 - 1).into_segmented(), 0f64..peak * 1.1)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&axis)
            .x_desc("rating")
            .y_desc("count")
            .draw()?;

        let color = accent();
        chart.draw_series(self.counts.iter().enumerate().map(|(i, (_, count))| {
            Rectangle::new(
                [(segment_edge(i, n), 0.0), (segment_edge(i + 1, n), *count as f64)],
                color.filled(),
            )
        }))?;
        Ok(())
    }
}
