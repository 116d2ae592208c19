use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::{segment_edge, segment_label, Chart, DrawResult, FONT};
use crate::color::coolwarm;
use crate::stats::CorrelationMatrix;

/// Annotated correlation matrix. Undefined coefficients are left blank.
pub struct CorrelationHeatmap<'a> {
    matrix: &'a CorrelationMatrix,
}

impl<'a> CorrelationHeatmap<'a> {
    /// Needs at least two numeric columns to say anything.
    pub fn new(matrix: &'a CorrelationMatrix) -> Option<Self> {
        (matrix.columns.len() > 1).then_some(CorrelationHeatmap { matrix })
    }
}

impl Chart for CorrelationHeatmap<'_> {
    fn file_stem(&self) -> String {
        "correlation_heatmap".to_string()
    }

    fn size(&self) -> (u32, u32) {
        (1000, 800)
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> DrawResult<DB> {
        let labels = &self.matrix.columns;
        let n = labels.len();
        // rows run top to bottom, so the y axis reads the labels backwards
        let reversed: Vec<String> = labels.iter().rev().cloned().collect();
        let x_axis = |v: &SegmentValue<i32>| segment_label(labels, v);
        let y_axis = |v: &SegmentValue<i32>| segment_label(&reversed, v);

        let mut chart = ChartBuilder::on(root)
            .caption("Correlation Heatmap", (FONT, 24))
            .margin(15)
            .x_label_area_size(60)
            .y_label_area_size(140)
            .build_cartesian_2d(
                (0..n as i32 - 1).into_segmented(),
                (0..n as i32 - 1).into_segmented(),
            )?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(n)
            .y_labels(n)
            .x_label_formatter(&x_axis)
            .y_label_formatter(&y_axis)
            .draw()?;

        let cells: Vec<(usize, usize, f64)> = self
            .matrix
            .values
            .iter()
            .enumerate()
            .flat_map(|(i, row)| {
                row.iter()
                    .enumerate()
                    .filter_map(move |(j, r)| r.map(|r| (n - 1 - i, j, r)))
            })
            .collect();

        chart.draw_series(cells.iter().map(|&(row, col, r)| {
            Rectangle::new(
                [
                    (segment_edge(col, n), segment_edge(row, n)),
                    (segment_edge(col + 1, n), segment_edge(row + 1, n)),
                ],
                coolwarm(r).filled(),
            )
        }))?;

        chart.draw_series(cells.iter().map(|&(row, col, r)| {
            Text::new(
                format!("{r:.2}"),
                (SegmentValue::CenterOf(col as i32), SegmentValue::CenterOf(row as i32)),
                (FONT, 13).into_font().color(&BLACK).pos(Pos::new(HPos::Center, VPos::Center)),
            )
        }))?;

        Ok(())
    }
}
