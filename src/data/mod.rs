//! Data layer: core types, loading, and writing.
//!
//! Architecture:
//! ```text
//!  .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → Dataset (per-column type inference)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ Dataset   │  Vec<Column>, equal-length invariant
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  writer   │  cleaned table → .csv / .parquet / console preview
//!   └──────────┘
//! ```

pub mod loader;
pub mod model;
pub mod writer;
