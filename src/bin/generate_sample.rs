use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Write a synthetic Amazon orders/reviews CSV with the usual defects
/// (duplicates, blanks, padding, unparseable cells) for the analyzer to
/// clean up.
#[derive(Parser, Debug)]
struct Args {
    /// Number of orders before duplicates are appended
    #[arg(long, default_value_t = 5000)]
    rows: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    #[arg(long, default_value = "Data/amazon_synthetic_large.csv")]
    out: PathBuf,
}

const CATEGORIES: [(&str, f64); 8] = [
    ("Electronics", 180.0),
    ("Books", 18.0),
    ("Home & Kitchen", 45.0),
    ("Clothing", 35.0),
    ("Toys", 25.0),
    ("Beauty", 20.0),
    ("Sports", 60.0),
    ("Grocery", 12.0),
];

const REVIEWS: [&str; 5] = [
    "Stopped working after a week.",
    "Not what the photos showed.",
    "Does the job.",
    "Good value for the price, would buy again.",
    "Excellent quality, arrived early and works perfectly. Highly recommended!",
];

/// Normal sample via Box-Muller.
fn gauss(rng: &mut StdRng, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.random::<f64>().max(1e-15);
    let u2: f64 = rng.random();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + std_dev * z
}

/// One of the ways a real export goes wrong, or the cell untouched.
fn spoil(rng: &mut StdRng, cell: String) -> String {
    match rng.random_range(0..100) {
        0..=2 => String::new(),
        3 => "N/A".to_string(),
        4 => format!("  {cell} "),
        _ => cell,
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = StdRng::seed_from_u64(args.seed);
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).context("start date")?;
    let products_per_category = 40;

    let mut rows: Vec<Vec<String>> = Vec::with_capacity(args.rows);
    for i in 0..args.rows {
        let cat_idx = rng.random_range(0..CATEGORIES.len());
        let (category, base_price) = CATEGORIES[cat_idx];
        let product = rng.random_range(0..products_per_category);
        let product_id = format!("P{:03}{:02}", cat_idx, product);

        let price = (gauss(&mut rng, base_price, base_price * 0.25)).max(1.0);
        let price = (price * 100.0).round() / 100.0;
        let quantity: u32 = if rng.random_bool(0.01) { 0 } else { rng.random_range(1..=5) };
        let total = (price * quantity.max(1) as f64 * 100.0).round() / 100.0;
        let shipping = if price > 35.0 { 0.0 } else { 4.99 };

        // pricier items skew towards better ratings
        let lean = (price / (base_price * 2.0)).min(1.0);
        let rating = (gauss(&mut rng, 3.2 + lean, 1.0).round()).clamp(1.0, 5.0);
        let review = REVIEWS[(rating as usize - 1).min(REVIEWS.len() - 1)];

        let order_date = start + Days::new(rng.random_range(0..540));
        let ship_date = order_date + Days::new(rng.random_range(1..8));
        let review_date = ship_date + Days::new(rng.random_range(2..45));

        let mut order_cell = order_date.format("%Y-%m-%d").to_string();
        if rng.random_range(0..200) == 0 {
            order_cell = "not recorded".to_string();
        }

        rows.push(vec![
            format!("O{:06}", i + 1),
            product_id,
            spoil(&mut rng, category.to_string()),
            spoil(&mut rng, format!("{price:.2}")),
            quantity.to_string(),
            format!("{total:.2}"),
            format!("{shipping:.2}"),
            spoil(&mut rng, format!("{rating}")),
            order_cell,
            ship_date.format("%Y-%m-%d").to_string(),
            review_date.format("%Y-%m-%d").to_string(),
            spoil(&mut rng, review.to_string()),
        ]);
    }

    // exact re-exports of ~2% of the orders
    let duplicates = if rows.is_empty() { 0 } else { args.rows / 50 };
    for _ in 0..duplicates {
        let idx = rng.random_range(0..rows.len());
        rows.push(rows[idx].clone());
    }

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let mut writer = csv::Writer::from_path(&args.out)
        .with_context(|| format!("creating {}", args.out.display()))?;
    writer.write_record([
        "order_id",
        "product_id",
        "category",
        "price",
        "quantity",
        "total_amount",
        "shipping_cost",
        "rating",
        "order_date",
        "ship_date",
        "review_date",
        "review_text",
    ])?;
    for row in &rows {
        writer.write_record(row)?;
    }
    writer.flush()?;

    println!(
        "Wrote {} orders ({} duplicated) to {}",
        rows.len(),
        duplicates,
        args.out.display()
    );
    Ok(())
}
