use plotters::coord::Shift;
use plotters::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::{padded_range, Chart, DrawResult, FONT};
use crate::color::accent;

/// Price against rating for a reproducible random sample of rows.
pub struct PriceRatingScatter {
    points: Vec<(f64, f64)>,
    sampled: bool,
}

impl PriceRatingScatter {
    /// Keep at most `limit` of the complete `(price, rating)` pairs, chosen
    /// with a generator seeded by `seed`.
    pub fn new(points: Vec<(f64, f64)>, limit: usize, seed: u64) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let sampled = points.len() > limit;
        let points = if sampled {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut picked = rand::seq::index::sample(&mut rng, points.len(), limit).into_vec();
            picked.sort_unstable();
            picked.into_iter().map(|i| points[i]).collect()
        } else {
            points
        };
        Some(PriceRatingScatter { points, sampled })
    }

    /// Points actually plotted.
    pub fn point_count(&self) -> usize {
        self.points.len()
    }
}

impl Chart for PriceRatingScatter {
    fn file_stem(&self) -> String {
        "price_vs_rating".to_string()
    }

    fn size(&self) -> (u32, u32) {
        (700, 500)
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> DrawResult<DB> {
        let (Some(xs), Some(ys)) = (
            padded_range(self.points.iter().map(|p| p.0)),
            padded_range(self.points.iter().map(|p| p.1)),
        ) else {
            return Ok(());
        };
        let caption = if self.sampled {
            "Price vs Rating (Sampled)"
        } else {
            "Price vs Rating"
        };

        let mut chart = ChartBuilder::on(root)
            .caption(caption, (FONT, 22))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(xs, ys)?;

        chart.configure_mesh().x_desc("price").y_desc("rating").draw()?;

        let color = accent().mix(0.6);
        chart.draw_series(
            self.points
                .iter()
                .map(|&p| Circle::new(p, 3, color.filled())),
        )?;
        Ok(())
    }
}
