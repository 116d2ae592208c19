//! End-to-end runs of the analysis over small order files.
use std::fs;
use std::path::{Path, PathBuf};

use amazon_eda::charts::ChartFormat;
use amazon_eda::data::loader::load_file;
use amazon_eda::runner::{CLEANED_CSV, CORRELATION_CSV, DESCRIPTION_CSV, NUMERIC_SUMMARY_CSV, TOP_PRODUCTS_CSV};
use amazon_eda::{run, EdaConfig, EdaError};

const ORDERS: &str = "\
order_id,product_id,category,price,quantity,total_amount,rating,order_date,ship_date,review_date,review_text
O1,P1,Books,12.50,2,25.00,5,2024-01-01,2024-01-03,2024-01-10,Loved it
O2,P2, Toys ,30.00,1,30.00,4,2024-01-02,2024-01-05,2024-01-20,Fun for the kids
O3,P1,Books,12.50,1,12.50,3,2024-01-03,2024-01-04,,Okay
O4,P3,Electronics,abc,1,199.99,2,2024-01-04,2024-01-09,2024-01-30,Broke quickly
O5,P3,Electronics,199.99,0,199.99,,2024-01-05,2024-01-06,2024-02-01,
O6,P4,,8.00,3,24.00,4,not a date,2024-01-08,2024-01-15,Cheap and cheerful
O7,P2,Toys,30.00,2,60.00,5,2024-01-07,2024-01-09,2024-01-12,Great gift
O7,P2,Toys,30.00,2,60.00,5,2024-01-07,2024-01-09,2024-01-12,Great gift
O8,P5,Books,15.00,1,15.00,1,2024-01-08,2024-01-10,2024-01-11,Pages missing
";

fn write_orders(dir: &Path) -> PathBuf {
    let path = dir.join("orders.csv");
    fs::write(&path, ORDERS).expect("Failed to write orders");
    path
}

fn config_for(data_path: PathBuf, output_dir: PathBuf) -> EdaConfig {
    EdaConfig {
        data_path,
        output_dir,
        ..EdaConfig::default()
    }
}

#[test]
fn test_loading_keeps_every_row() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let dataset = load_file(&write_orders(dir.path())).expect("Failed to load orders");
    assert_eq!(dataset.shape(), (9, 11));
}

#[test]
fn test_full_run_produces_tables_and_charts() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = config_for(write_orders(dir.path()), dir.path().join("outputs"));

    let summary = run(&config).expect("Analysis failed");

    assert_eq!(summary.loaded_shape, (9, 11));
    assert_eq!(summary.cleaning.duplicates_removed, 1);
    assert_eq!(summary.cleaning.coerced_to_missing, 1);
    assert_eq!(summary.cleaning.unparsed_dates, 1);
    assert_eq!(summary.cleaned_shape, (8, 15));
    assert_eq!(
        summary.features,
        vec!["delivery_days", "review_delay_days", "review_length", "price_per_item"]
    );

    assert_eq!(summary.top_products[0].product_id, "P3");
    assert_eq!(summary.top_products[1].product_id, "P2");
    assert_eq!(summary.top_products[1].total_revenue, 90.0);
    assert_eq!(summary.highlights.top_categories[0], ("Books".to_string(), 3));

    let rating = summary.highlights.rating.as_ref().expect("No rating summary");
    assert_eq!(rating.count, 8);
    assert_eq!(rating.median, 4.0);

    // six distributions, heatmap, categories, ratings, scatter, box plot
    assert_eq!(summary.charts.len(), 11);
    for chart in &summary.charts {
        assert!(chart.exists(), "missing chart {}", chart.display());
        assert_eq!(chart.extension().and_then(|e| e.to_str()), Some("svg"));
    }
    assert!(summary.charts.iter().any(|c| c.ends_with("correlation_heatmap.svg")));
    assert!(summary.charts.iter().any(|c| c.ends_with("review_length_by_rating.svg")));

    let data_dir = config.derived_dir();
    for table in [CLEANED_CSV, DESCRIPTION_CSV, NUMERIC_SUMMARY_CSV, CORRELATION_CSV, TOP_PRODUCTS_CSV] {
        assert!(data_dir.join(table).exists(), "missing table {table}");
    }
    assert!(data_dir.join("run_summary.json").exists());
}

#[test]
fn test_cleaned_output_has_no_gaps_in_targeted_columns() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = config_for(write_orders(dir.path()), dir.path().join("outputs"));
    run(&config).expect("Analysis failed");

    let cleaned = load_file(&config.derived_dir().join(CLEANED_CSV)).expect("Failed to reload");
    assert_eq!(cleaned.len(), 8);
    for name in ["price", "quantity", "rating", "category", "review_text", "review_length", "delivery_days"] {
        let column = cleaned.column(name).unwrap_or_else(|| panic!("no column {name}"));
        assert_eq!(column.null_count(), 0, "{name} still has gaps");
    }
    let category = cleaned.column("category").expect("no category");
    assert!(category.values.iter().any(|v| v.as_str() == Some("Unknown")));
    assert!(category.values.iter().all(|v| v.as_str() != Some(" Toys ")));
}

#[test]
fn test_repeated_runs_are_identical() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let input = write_orders(dir.path());
    let first = config_for(input.clone(), dir.path().join("first"));
    let second = config_for(input, dir.path().join("second"));

    run(&first).expect("First run failed");
    run(&second).expect("Second run failed");

    for table in [CLEANED_CSV, DESCRIPTION_CSV, NUMERIC_SUMMARY_CSV, CORRELATION_CSV, TOP_PRODUCTS_CSV] {
        let a = fs::read(first.derived_dir().join(table)).expect("read first");
        let b = fs::read(second.derived_dir().join(table)).expect("read second");
        assert_eq!(a, b, "{table} differs between runs");
    }
    let a = fs::read(first.plots_dir().join("price_vs_rating.svg")).expect("read first chart");
    let b = fs::read(second.plots_dir().join("price_vs_rating.svg")).expect("read second chart");
    assert_eq!(a, b);
}

#[test]
fn test_json_input_with_png_charts_and_parquet() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("reviews.json");
    fs::write(
        &input,
        r#"[
            {"product_id": "A", "category": "Books", "price": 10, "rating": 4, "total_amount": 20, "quantity": 2},
            {"product_id": "B", "category": "Toys", "price": 25.5, "rating": 2, "total_amount": 25.5, "quantity": 1},
            {"product_id": "A", "category": "Books", "price": 10, "rating": null, "total_amount": 10, "quantity": 1}
        ]"#,
    )
    .expect("Failed to write json");

    let mut config = config_for(input, dir.path().join("out"));
    config.chart_format = ChartFormat::Png;
    config.write_parquet = true;

    let summary = run(&config).expect("Analysis failed");
    assert_eq!(summary.cleaned_shape.0, 3);
    assert!(summary.features.contains(&"price_per_item".to_string()));

    let chart = config.plots_dir().join("price_vs_rating.png");
    let bytes = fs::read(&chart).expect("no png chart");
    assert_eq!(&bytes[..4], b"\x89PNG");

    let parquet = load_file(&config.derived_dir().join("cleaned_amazon.parquet")).expect("Failed to reload parquet");
    assert_eq!(parquet.len(), 3);
    assert_eq!(parquet.column("rating").expect("no rating").null_count(), 0);
}

#[test]
fn test_missing_dataset_is_reported() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = config_for(dir.path().join("nope.csv"), dir.path().join("outputs"));

    let err = run(&config).expect_err("Run should fail");
    assert!(matches!(
        err.downcast_ref::<EdaError>(),
        Some(EdaError::DatasetNotFound(_))
    ));
}

#[test]
fn test_infinite_prices_do_not_stall_the_run() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("orders.csv");
    fs::write(
        &input,
        "product_id,price,rating,total_amount\n\
         P1,inf,4,10\n\
         P2,3.5,5,7\n\
         P3,2.0,3,-infinity\n\
         P4,4.0,2,8\n",
    )
    .expect("Failed to write orders");
    let config = config_for(input, dir.path().join("outputs"));

    let summary = run(&config).expect("Analysis failed");
    assert_eq!(summary.cleaned_shape.0, 4);
    assert!(summary.charts.iter().any(|c| c.ends_with("price_distribution.svg")));

    let cleaned = load_file(&config.derived_dir().join(CLEANED_CSV)).expect("Failed to reload");
    for name in ["price", "total_amount"] {
        let column = cleaned.column(name).expect("missing column");
        assert_eq!(column.null_count(), 0);
        assert!(column.numeric_values().iter().all(|v| v.is_finite()), "{name} kept an infinity");
    }
}
