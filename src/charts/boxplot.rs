use plotters::coord::Shift;
use plotters::prelude::*;

use super::{rating_label, segment_label, Chart, DrawResult, FONT};
use crate::color::generate_palette;

/// Review length distribution for each rating value.
pub struct RatingBoxplot {
    groups: Vec<(f64, Vec<f64>)>,
}

impl RatingBoxplot {
    /// `groups` pairs each rating with its review lengths, ascending by
    /// rating.
    pub fn new(groups: Vec<(f64, Vec<f64>)>) -> Option<Self> {
        let groups: Vec<_> = groups.into_iter().filter(|(_, v)| !v.is_empty()).collect();
        (!groups.is_empty()).then_some(RatingBoxplot { groups })
    }
}

impl Chart for RatingBoxplot {
    fn file_stem(&self) -> String {
        "review_length_by_rating".to_string()
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> DrawResult<DB> {
        let n = self.groups.len();
        let labels: Vec<String> = self.groups.iter().map(|(r, _)| rating_label(*r)).collect();
        let axis = |v: &SegmentValue<i32>| segment_label(&labels, v);
        let top = self
            .groups
            .iter()
            .flat_map(|(_, v)| v.iter().copied())
            .fold(1.0, f64::max) as f32;

        let mut chart = ChartBuilder::on(root)
            .caption("Review Length by Rating", (FONT, 22))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(55)
            .build_cartesian_2d((0..n as i32 - 1).into_segmented(), 0f32..top * 1.05)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&axis)
            .x_desc("rating")
            .y_desc("review_length")
            .draw()?;

        let palette = generate_palette(n);
        for (i, (_, lengths)) in self.groups.iter().enumerate() {
            let quartiles = Quartiles::new(lengths);
            let [lower, _, _, _, upper] = quartiles.values();
            let key = SegmentValue::CenterOf(i as i32);

            chart.draw_series(std::iter::once(
                Boxplot::new_vertical(key.clone(), &quartiles)
                    .width(30)
                    .whisker_width(0.5)
                    .style(palette[i]),
            ))?;

            // points beyond the whiskers
            chart.draw_series(
                lengths
                    .iter()
                    .map(|&v| v as f32)
                    .filter(|&v| v < lower || v > upper)
                    .map(|v| Circle::new((key.clone(), v), 2, palette[i].filled())),
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_groups_are_dropped() {
        assert!(RatingBoxplot::new(vec![(1.0, Vec::new())]).is_none());
        let chart = RatingBoxplot::new(vec![(1.0, Vec::new()), (2.0, vec![3.0])]).unwrap();
        assert_eq!(chart.groups.len(), 1);
    }
}
