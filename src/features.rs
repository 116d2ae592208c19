//! Derived columns computed from the cleaned order data.

use anyhow::Result;
use log::info;

use crate::data::model::{Column, Dataset, Value};

/// Add every derived column whose sources are present. Returns the names of
/// the columns added.
pub fn engineer(dataset: &mut Dataset) -> Result<Vec<String>> {
    let mut added = Vec::new();

    if let Some(col) = day_difference(dataset, "ship_date", "order_date", "delivery_days") {
        added.push(col.name.clone());
        dataset.set_column(col)?;
    }
    if let Some(col) = day_difference(dataset, "review_date", "order_date", "review_delay_days") {
        added.push(col.name.clone());
        dataset.set_column(col)?;
    }
    if let Some(col) = text_length(dataset, "review_text", "review_length") {
        added.push(col.name.clone());
        dataset.set_column(col)?;
    }
    if let Some(col) = price_per_item(dataset) {
        added.push(col.name.clone());
        dataset.set_column(col)?;
    }

    if !added.is_empty() {
        info!("engineered features: {}", added.join(", "));
    }
    Ok(added)
}

/// Whole days from `earlier` to `later`.
fn day_difference(dataset: &Dataset, later: &str, earlier: &str, name: &str) -> Option<Column> {
    let later = dataset.column(later)?;
    let earlier = dataset.column(earlier)?;
    let values = later
        .values
        .iter()
        .zip(&earlier.values)
        .map(|(l, e)| match (l.as_date(), e.as_date()) {
            (Some(l), Some(e)) => Value::Integer((l - e).num_days()),
            _ => Value::Null,
        })
        .collect();
    Some(Column::new(name, values))
}

fn text_length(dataset: &Dataset, source: &str, name: &str) -> Option<Column> {
    let source = dataset.column(source)?;
    let values = source
        .values
        .iter()
        .map(|v| match v {
            Value::Null => Value::Null,
            Value::String(s) => Value::Integer(s.chars().count() as i64),
            other => Value::Integer(other.to_field().chars().count() as i64),
        })
        .collect();
    Some(Column::new(name, values))
}

/// `total_amount / quantity`, reading a zero quantity as one.
fn price_per_item(dataset: &Dataset) -> Option<Column> {
    let total = dataset.column("total_amount")?;
    let quantity = dataset.column("quantity")?;
    let values = total
        .values
        .iter()
        .zip(&quantity.values)
        .map(|(t, q)| match (t.as_f64(), q.as_f64()) {
            (Some(t), Some(q)) => Value::Float(t / if q == 0.0 { 1.0 } else { q }),
            _ => Value::Null,
        })
        .collect();
    Some(Column::new("price_per_item", values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> Value {
        Value::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn engineer_adds_all_features() {
        let mut ds = Dataset::from_columns(vec![
            Column::new("order_date", vec![date(2024, 1, 1), date(2024, 2, 28), Value::Null]),
            Column::new("ship_date", vec![date(2024, 1, 4), date(2024, 3, 1), date(2024, 1, 1)]),
            Column::new("review_date", vec![date(2024, 1, 11), Value::Null, Value::Null]),
            Column::new(
                "review_text",
                vec![Value::String("Great".into()), Value::String("héllo".into()), Value::Null],
            ),
            Column::new("total_amount", vec![Value::Float(30.0), Value::Float(9.0), Value::Float(5.0)]),
            Column::new("quantity", vec![Value::Float(3.0), Value::Float(0.0), Value::Null]),
        ])
        .unwrap();

        let added = engineer(&mut ds).unwrap();
        assert_eq!(
            added,
            vec!["delivery_days", "review_delay_days", "review_length", "price_per_item"]
        );

        let delivery = &ds.column("delivery_days").unwrap().values;
        assert_eq!(delivery, &vec![Value::Integer(3), Value::Integer(2), Value::Null]);

        let delay = &ds.column("review_delay_days").unwrap().values;
        assert_eq!(delay[0], Value::Integer(10));
        assert_eq!(delay[1], Value::Null);

        let length = &ds.column("review_length").unwrap().values;
        assert_eq!(length, &vec![Value::Integer(5), Value::Integer(5), Value::Null]);

        let per_item = &ds.column("price_per_item").unwrap().values;
        assert_eq!(per_item, &vec![Value::Float(10.0), Value::Float(9.0), Value::Null]);
    }

    #[test]
    fn features_need_their_sources() {
        let mut ds = Dataset::from_columns(vec![Column::new("rating", vec![Value::Integer(4)])]).unwrap();
        assert!(engineer(&mut ds).unwrap().is_empty());
        assert_eq!(ds.width(), 1);
    }
}
