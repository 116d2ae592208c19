use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::EdaError;

// ---------------------------------------------------------------------------
// Value – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the dtypes a CSV column can take.
/// Rows are hashed for deduplication and values are counted in ordered
/// maps, so `Value` must be `Eq + Ord + Hash`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Null,
}

// -- Manual Eq/Ord/Hash so floats can live in sets and maps --

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Date(_) => 4,
                String(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::String(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Date(d) => d.hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v:.4}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Null => write!(f, "<null>"),
        }
    }
}

impl Value {
    /// Interpret the value as an `f64` for numeric statistics.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Lossless text form used when writing CSV cells.
    pub fn to_field(&self) -> String {
        match self {
            Value::Float(v) => v.to_string(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    fn kind(&self) -> Option<ColumnKind> {
        match self {
            Value::String(_) => Some(ColumnKind::Text),
            Value::Integer(_) => Some(ColumnKind::Integer),
            Value::Float(_) => Some(ColumnKind::Float),
            Value::Bool(_) => Some(ColumnKind::Bool),
            Value::Date(_) => Some(ColumnKind::Date),
            Value::Null => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ColumnKind – inferred dtype of a column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Integer,
    Float,
    Bool,
    Date,
    Text,
    /// Every cell is missing.
    Empty,
}

impl ColumnKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }

    fn merge(self, other: ColumnKind) -> ColumnKind {
        use ColumnKind::*;
        match (self, other) {
            (Empty, k) | (k, Empty) => k,
            (a, b) if a == b => a,
            (Integer, Float) | (Float, Integer) => Float,
            _ => Text,
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnKind::Integer => "int64",
            ColumnKind::Float => "float64",
            ColumnKind::Bool => "bool",
            ColumnKind::Date => "date",
            ColumnKind::Text => "text",
            ColumnKind::Empty => "empty",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

/// A named column. The kind is derived from the values, never stored, so it
/// can't drift as cleaning rewrites cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    /// Build a column, widening integers to floats when the column mixes
    /// both.
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        let mut column = Column {
            name: name.into(),
            values,
        };
        column.normalize();
        column
    }

    pub fn kind(&self) -> ColumnKind {
        self.values
            .iter()
            .filter_map(Value::kind)
            .fold(ColumnKind::Empty, ColumnKind::merge)
    }

    pub fn is_numeric(&self) -> bool {
        self.kind().is_numeric()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    /// Non-missing numeric values, in row order.
    pub fn numeric_values(&self) -> Vec<f64> {
        self.values.iter().filter_map(Value::as_f64).collect()
    }

    /// Replace every missing cell with `fill`; returns how many were filled.
    pub fn fill_nulls(&mut self, fill: &Value) -> usize {
        let mut filled = 0;
        for value in self.values.iter_mut().filter(|v| v.is_null()) {
            *value = fill.clone();
            filled += 1;
        }
        if filled > 0 {
            self.normalize();
        }
        filled
    }

    fn normalize(&mut self) {
        if self.kind() == ColumnKind::Float {
            for value in &mut self.values {
                if let Value::Integer(i) = value {
                    *value = Value::Float(*i as f64);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The in-memory table: ordered columns of equal length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
}

impl Dataset {
    /// Assemble a dataset, checking that columns are uniquely named and of
    /// equal length.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, EdaError> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(EdaError::DuplicateColumn(column.name.clone()));
            }
        }
        if let Some(first) = columns.first() {
            let expected = first.len();
            if let Some(bad) = columns.iter().find(|c| c.len() != expected) {
                return Err(EdaError::ColumnLength {
                    column: bad.name.clone(),
                    expected,
                    actual: bad.len(),
                });
            }
        }
        Ok(Dataset { columns })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.len(), self.width())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn columns_mut(&mut self) -> impl Iterator<Item = &mut Column> {
        self.columns.iter_mut()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn numeric_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.is_numeric()).collect()
    }

    /// Borrow the cells of row `index`, in column order.
    pub fn row(&self, index: usize) -> Vec<&Value> {
        self.columns.iter().map(|c| &c.values[index]).collect()
    }

    /// Insert a column, or replace the one with the same name in place.
    pub fn set_column(&mut self, column: Column) -> Result<(), EdaError> {
        let actual = column.len();
        if !self.columns.is_empty() && actual != self.len() {
            return Err(EdaError::ColumnLength {
                column: column.name,
                expected: self.len(),
                actual,
            });
        }
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
        Ok(())
    }

    /// Keep only the rows whose entry in `keep` is `true`.
    pub fn retain_rows(&mut self, keep: &[bool]) {
        for column in &mut self.columns {
            let mut mask = keep.iter();
            column.values.retain(|_| mask.next().copied().unwrap_or(false));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_inference_widens_integers() {
        let col = Column::new("price", vec![Value::Integer(3), Value::Float(2.5), Value::Null]);
        assert_eq!(col.kind(), ColumnKind::Float);
        assert_eq!(col.values[0], Value::Float(3.0));

        let mixed = Column::new("mixed", vec![Value::Integer(1), Value::String("a".into())]);
        assert_eq!(mixed.kind(), ColumnKind::Text);

        let empty = Column::new("blank", vec![Value::Null, Value::Null]);
        assert_eq!(empty.kind(), ColumnKind::Empty);
        assert!(!empty.is_numeric());
    }

    #[test]
    fn from_columns_rejects_ragged_and_duplicate_columns() {
        let ragged = Dataset::from_columns(vec![
            Column::new("a", vec![Value::Integer(1)]),
            Column::new("b", vec![]),
        ]);
        assert!(matches!(ragged, Err(EdaError::ColumnLength { .. })));

        let dup = Dataset::from_columns(vec![
            Column::new("a", vec![Value::Integer(1)]),
            Column::new("a", vec![Value::Integer(2)]),
        ]);
        assert!(matches!(dup, Err(EdaError::DuplicateColumn(_))));
    }

    #[test]
    fn set_column_replaces_in_place() {
        let mut ds = Dataset::from_columns(vec![
            Column::new("a", vec![Value::Integer(1), Value::Integer(2)]),
            Column::new("b", vec![Value::Null, Value::Null]),
        ])
        .unwrap();
        ds.set_column(Column::new("a", vec![Value::Bool(true), Value::Bool(false)]))
            .unwrap();
        assert_eq!(ds.column_names(), vec!["a", "b"]);
        assert_eq!(ds.column("a").unwrap().kind(), ColumnKind::Bool);
        let err = ds.set_column(Column::new("c", vec![Value::Null])).unwrap_err();
        assert!(matches!(
            err,
            EdaError::ColumnLength { ref column, expected: 2, actual: 1 } if column == "c"
        ));
        assert!(ds.has_column("b") && !ds.has_column("c"));
    }

    #[test]
    fn retain_rows_applies_mask_to_every_column() {
        let mut ds = Dataset::from_columns(vec![
            Column::new("a", vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]),
            Column::new("b", vec![Value::Null, Value::Bool(true), Value::Null]),
        ])
        .unwrap();
        ds.retain_rows(&[true, false, true]);
        assert_eq!(ds.shape(), (2, 2));
        assert_eq!(ds.row(1), vec![&Value::Integer(3), &Value::Null]);
    }

    #[test]
    fn fill_nulls_counts_and_normalizes() {
        let mut col = Column::new("q", vec![Value::Integer(1), Value::Null]);
        assert_eq!(col.fill_nulls(&Value::Float(1.5)), 1);
        assert_eq!(col.values, vec![Value::Float(1.0), Value::Float(1.5)]);
    }
}
