use std::path::PathBuf;

use thiserror::Error;

/// Failures the analysis can name. Everything else travels as
/// `anyhow::Error` with context attached at the failing step.
#[derive(Debug, Error)]
pub enum EdaError {
    #[error("dataset not found: {}", .0.display())]
    DatasetNotFound(PathBuf),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("column '{column}' has {actual} values but the dataset has {expected} rows")]
    ColumnLength {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),

    #[error("failed to render {}: {message}", .path.display())]
    Chart { path: PathBuf, message: String },
}
