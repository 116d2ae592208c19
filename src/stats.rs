//! Descriptive statistics over a [`Dataset`].
//!
//! Missing cells are skipped everywhere. Nothing here depends on hash-map
//! iteration order, so repeated runs over the same data agree exactly.

use std::collections::HashMap;

use serde::Serialize;

use crate::data::model::{Column, Dataset, Value};

// ---------------------------------------------------------------------------
// Scalar helpers
// ---------------------------------------------------------------------------

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n − 1 denominator).
pub fn std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

pub fn median(values: &[f64]) -> Option<f64> {
    quantile(&sorted(values), 0.5)
}

/// Quantile of an already sorted slice, interpolating linearly between the
/// two closest ranks.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(f64::total_cmp);
    out
}

/// Pearson correlation of two equally long samples.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let mx = mean(xs)?;
    let my = mean(ys)?;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let (dx, dy) = (x - mx, y - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

// ---------------------------------------------------------------------------
// describe()
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub q50: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl NumericSummary {
    pub fn of(column: &Column) -> Self {
        let values = column.numeric_values();
        let s = sorted(&values);
        NumericSummary {
            column: column.name.clone(),
            count: values.len(),
            mean: mean(&values),
            std: std_dev(&values),
            min: s.first().copied(),
            q25: quantile(&s, 0.25),
            q50: quantile(&s, 0.5),
            q75: quantile(&s, 0.75),
            max: s.last().copied(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalSummary {
    pub column: String,
    pub count: usize,
    pub unique: usize,
    pub top: Option<String>,
    pub freq: usize,
}

impl CategoricalSummary {
    pub fn of(column: &Column) -> Self {
        let counts = count_values(column);
        // ties go to the value seen first
        let top = counts
            .iter()
            .fold(None::<&(&Value, usize)>, |best, entry| match best {
                Some(b) if b.1 >= entry.1 => Some(b),
                _ => Some(entry),
            });
        CategoricalSummary {
            column: column.name.clone(),
            count: column.len() - column.null_count(),
            unique: counts.len(),
            top: top.map(|(v, _)| v.to_field()),
            freq: top.map_or(0, |(_, n)| *n),
        }
    }
}

/// Column-wise summary of the whole table, in column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Description {
    pub numeric: Vec<NumericSummary>,
    pub categorical: Vec<CategoricalSummary>,
    /// Column names in dataset order.
    pub order: Vec<String>,
}

pub fn describe(dataset: &Dataset) -> Description {
    let mut description = Description::default();
    for column in dataset.columns() {
        description.order.push(column.name.clone());
        if column.is_numeric() {
            description.numeric.push(NumericSummary::of(column));
        } else {
            description.categorical.push(CategoricalSummary::of(column));
        }
    }
    description
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// `values[i][j]`; `None` where the coefficient is undefined.
    pub values: Vec<Vec<Option<f64>>>,
}

/// Pearson correlation between every pair of numeric columns, each pair
/// using only the rows where both cells are present.
pub fn correlation_matrix(dataset: &Dataset) -> CorrelationMatrix {
    let numeric = dataset.numeric_columns();
    let n = numeric.len();
    let mut values = vec![vec![None; n]; n];

    for i in 0..n {
        for j in i..n {
            let (xs, ys): (Vec<f64>, Vec<f64>) = numeric[i]
                .values
                .iter()
                .zip(&numeric[j].values)
                .filter_map(|(a, b)| Some((a.as_f64()?, b.as_f64()?)))
                .unzip();
            let r = pearson(&xs, &ys);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        columns: numeric.iter().map(|c| c.name.clone()).collect(),
        values,
    }
}

// ---------------------------------------------------------------------------
// Counting
// ---------------------------------------------------------------------------

/// Non-missing values with their counts, in order of first appearance.
fn count_values(column: &Column) -> Vec<(&Value, usize)> {
    let mut index: HashMap<&Value, usize> = HashMap::new();
    let mut counts: Vec<(&Value, usize)> = Vec::new();
    for value in column.values.iter().filter(|v| !v.is_null()) {
        match index.get(value) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(value, counts.len());
                counts.push((value, 1));
            }
        }
    }
    counts
}

/// The `limit` most frequent values, most frequent first; equal counts are
/// ordered by value.
pub fn value_counts(column: &Column, limit: usize) -> Vec<(Value, usize)> {
    let mut counts: Vec<(Value, usize)> = count_values(column)
        .into_iter()
        .map(|(v, n)| (v.clone(), n))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts.truncate(limit);
    counts
}

// ---------------------------------------------------------------------------
// Distributions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bin {
    pub lo: f64,
    pub hi: f64,
    pub count: usize,
}

/// Equal-width bins spanning the sample. The last bin includes its upper
/// edge; a constant sample is spread over a unit-wide range around it.
pub fn histogram(values: &[f64], bins: usize) -> Vec<Bin> {
    let values: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let (mut lo, mut hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;
    let mut out: Vec<Bin> = (0..bins)
        .map(|i| Bin {
            lo: lo + width * i as f64,
            hi: if i + 1 == bins { hi } else { lo + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();
    for v in values {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

/// Gaussian kernel density estimate (Scott's rule bandwidth) evaluated at
/// `points` evenly spaced positions across the sample range.
pub fn gaussian_kde(values: &[f64], points: usize) -> Vec<(f64, f64)> {
    let Some(sd) = std_dev(values) else {
        return Vec::new();
    };
    if sd == 0.0 || points < 2 {
        return Vec::new();
    }
    let n = values.len() as f64;
    let bandwidth = sd * n.powf(-0.2);
    let s = sorted(values);
    let (lo, hi) = (s[0], s[s.len() - 1]);
    let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());

    (0..points)
        .map(|i| {
            let x = lo + (hi - lo) * i as f64 / (points - 1) as f64;
            let density: f64 = values
                .iter()
                .map(|v| (-0.5 * ((x - v) / bandwidth).powi(2)).exp())
                .sum();
            (x, density * norm)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Grouped aggregates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductAggregate {
    pub product_id: String,
    pub total_revenue: f64,
    pub total_qty: Option<f64>,
    pub avg_rating: Option<f64>,
}

/// Revenue, units and mean rating per `product_id`, highest revenue first.
/// Needs `product_id` and `total_amount`; `quantity` and `rating` are
/// optional.
pub fn top_products_by_revenue(dataset: &Dataset, limit: usize) -> Vec<ProductAggregate> {
    let (Some(ids), Some(amounts)) = (dataset.column("product_id"), dataset.column("total_amount"))
    else {
        return Vec::new();
    };
    let quantity = dataset.column("quantity");
    let rating = dataset.column("rating");

    struct Acc {
        revenue: f64,
        qty: f64,
        rating_sum: f64,
        rating_n: usize,
    }

    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Acc> = HashMap::new();

    for (row, id) in ids.values.iter().enumerate() {
        if id.is_null() {
            continue;
        }
        let key = id.to_field();
        let acc = groups.entry(key.clone()).or_insert_with(|| {
            order.push(key);
            Acc {
                revenue: 0.0,
                qty: 0.0,
                rating_sum: 0.0,
                rating_n: 0,
            }
        });
        acc.revenue += amounts.values[row].as_f64().unwrap_or(0.0);
        if let Some(q) = quantity.and_then(|c| c.values[row].as_f64()) {
            acc.qty += q;
        }
        if let Some(r) = rating.and_then(|c| c.values[row].as_f64()) {
            acc.rating_sum += r;
            acc.rating_n += 1;
        }
    }

    let mut out: Vec<ProductAggregate> = order
        .into_iter()
        .filter_map(|id| {
            let acc = groups.remove(&id)?;
            Some(ProductAggregate {
                product_id: id,
                total_revenue: acc.revenue,
                total_qty: quantity.map(|_| acc.qty),
                avg_rating: (acc.rating_n > 0).then(|| acc.rating_sum / acc.rating_n as f64),
            })
        })
        .collect();

    out.sort_by(|a, b| {
        b.total_revenue
            .total_cmp(&a.total_revenue)
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
    out.truncate(limit);
    out
}

// ---------------------------------------------------------------------------
// Headline numbers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Highlights {
    pub rating: Option<RatingSummary>,
    pub price: Option<NumericSummary>,
    pub top_categories: Vec<(String, usize)>,
}

/// Mean/median rating, price distribution and the most common categories.
pub fn highlights(dataset: &Dataset, top_categories: usize) -> Highlights {
    let rating = dataset
        .column("rating")
        .map(Column::numeric_values)
        .and_then(|r| {
            Some(RatingSummary {
                count: r.len(),
                mean: mean(&r)?,
                median: median(&r)?,
            })
        });

    let price = dataset
        .column("price")
        .filter(|c| c.is_numeric())
        .map(NumericSummary::of);

    let top_categories = dataset
        .column("category")
        .map(|c| {
            value_counts(c, top_categories)
                .into_iter()
                .map(|(v, n)| (v.to_field(), n))
                .collect()
        })
        .unwrap_or_default();

    Highlights {
        rating,
        price,
        top_categories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn floats(name: &str, values: &[Option<f64>]) -> Column {
        Column::new(name, values.iter().map(|v| v.map_or(Value::Null, Value::Float)).collect())
    }

    fn text(name: &str, values: &[&str]) -> Column {
        Column::new(
            name,
            values
                .iter()
                .map(|v| if v.is_empty() { Value::Null } else { Value::String(v.to_string()) })
                .collect(),
        )
    }

    #[test]
    fn quantiles_interpolate_linearly() {
        let s = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&s, 0.25), Some(1.75));
        assert_eq!(quantile(&s, 0.5), Some(2.5));
        assert_eq!(quantile(&s, 1.0), Some(4.0));
        assert_eq!(median(&[5.0, 1.0, 3.0]), Some(3.0));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn numeric_summary_matches_hand_computation() {
        let col = floats("price", &[Some(2.0), Some(4.0), None, Some(4.0), Some(5.0), Some(5.0), Some(7.0), Some(9.0)]);
        let s = NumericSummary::of(&col);
        assert_eq!(s.count, 7);
        assert!(approx(s.mean.unwrap(), 36.0 / 7.0));
        assert_eq!(s.min, Some(2.0));
        assert_eq!(s.q50, Some(5.0));
        assert_eq!(s.max, Some(9.0));
        assert!(approx(s.std.unwrap(), ((216.0 - 1296.0 / 7.0) / 6.0f64).sqrt()));
    }

    #[test]
    fn categorical_summary_prefers_first_seen_on_ties() {
        let col = text("category", &["Toys", "Books", "", "Books", "Toys", "Games"]);
        let s = CategoricalSummary::of(&col);
        assert_eq!(s.count, 5);
        assert_eq!(s.unique, 3);
        assert_eq!(s.top.as_deref(), Some("Toys"));
        assert_eq!(s.freq, 2);
    }

    #[test]
    fn value_counts_sorted_and_limited() {
        let col = text("category", &["b", "a", "c", "a", "b", "a", ""]);
        let counts = value_counts(&col, 2);
        assert_eq!(
            counts,
            vec![(Value::String("a".into()), 3), (Value::String("b".into()), 2)]
        );
    }

    #[test]
    fn correlation_uses_pairwise_complete_rows() {
        let ds = Dataset::from_columns(vec![
            floats("x", &[Some(1.0), Some(2.0), Some(3.0), Some(4.0)]),
            floats("y", &[Some(2.0), Some(4.0), None, Some(8.0)]),
            floats("flat", &[Some(1.0), Some(1.0), Some(1.0), Some(1.0)]),
            text("label", &["a", "b", "c", "d"]),
        ])
        .unwrap();
        let m = correlation_matrix(&ds);
        assert_eq!(m.columns, vec!["x", "y", "flat"]);
        assert!(approx(m.values[0][1].unwrap(), 1.0));
        assert_eq!(m.values[0][1], m.values[1][0]);
        assert!(approx(m.values[0][0].unwrap(), 1.0));
        assert_eq!(m.values[2][0], None);
    }

    #[test]
    fn histogram_covers_every_value() {
        let values = [0.0, 1.0, 2.0, 3.0, 4.0, 10.0];
        let bins = histogram(&values, 5);
        assert_eq!(bins.len(), 5);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), values.len());
        assert_eq!(bins[0].count, 2);
        assert_eq!(bins[4].count, 1);
        assert_eq!(bins[4].hi, 10.0);

        let flat = histogram(&[3.0, 3.0], 4);
        assert_eq!(flat[0].lo, 2.5);
        assert_eq!(flat[3].hi, 3.5);
        assert_eq!(flat.iter().map(|b| b.count).sum::<usize>(), 2);
    }

    #[test]
    fn histogram_skips_non_finite_values() {
        let bins = histogram(&[f64::INFINITY, 3.5, 2.0, f64::NAN], 4);
        assert_eq!(bins.len(), 4);
        assert_eq!(bins[0].lo, 2.0);
        assert_eq!(bins[3].hi, 3.5);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
        assert!(histogram(&[f64::INFINITY], 4).is_empty());
    }

    #[test]
    fn kde_integrates_to_about_one() {
        let values: Vec<f64> = (0..200).map(|i| (i % 20) as f64).collect();
        let curve = gaussian_kde(&values, 400);
        assert_eq!(curve.len(), 400);
        let step = curve[1].0 - curve[0].0;
        let area: f64 = curve.iter().map(|(_, d)| d * step).sum();
        // the grid stops at the sample range, so a little mass falls outside
        assert!(area > 0.85 && area < 1.01, "area = {area}");
        assert!(gaussian_kde(&[1.0, 1.0], 10).is_empty());
    }

    #[test]
    fn products_ranked_by_revenue() {
        let ds = Dataset::from_columns(vec![
            text("product_id", &["P1", "P2", "P1", "P3", "P2"]),
            floats("total_amount", &[Some(10.0), Some(50.0), Some(30.0), Some(5.0), None]),
            floats("quantity", &[Some(1.0), Some(5.0), Some(3.0), Some(1.0), Some(2.0)]),
            floats("rating", &[Some(4.0), Some(5.0), Some(2.0), None, Some(3.0)]),
        ])
        .unwrap();
        let top = top_products_by_revenue(&ds, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].product_id, "P2");
        assert_eq!(top[0].total_revenue, 50.0);
        assert_eq!(top[0].total_qty, Some(7.0));
        assert_eq!(top[0].avg_rating, Some(4.0));
        assert_eq!(top[1].product_id, "P1");
        assert_eq!(top[1].avg_rating, Some(3.0));
    }

    #[test]
    fn describe_is_deterministic() {
        let ds = Dataset::from_columns(vec![
            floats("rating", &[Some(4.0), Some(5.0), Some(1.0)]),
            text("category", &["Books", "Toys", "Books"]),
        ])
        .unwrap();
        assert_eq!(describe(&ds), describe(&ds));
        let h = highlights(&ds, 10);
        assert_eq!(h.rating.as_ref().map(|r| r.median), Some(4.0));
        assert_eq!(h.top_categories, vec![("Books".to_string(), 2), ("Toys".to_string(), 1)]);
        assert!(h.price.is_none());
    }
}
