//! Exploratory data analysis of Amazon order and review data.
//!
//! One linear pass per run: [`data::loader`] reads the table, [`clean`] and
//! [`features`] prepare it, [`stats`] summarizes it, [`charts`] draws it and
//! [`report`] writes the results. [`runner::run`] wires the steps together.

pub mod charts;
pub mod clean;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod report;
pub mod runner;
pub mod stats;

pub use config::EdaConfig;
pub use data::model::{Column, ColumnKind, Dataset, Value};
pub use error::EdaError;
pub use runner::{run, RunSummary};
