// crates/echemflux-core/src/error.rs

use echemflux_parser::ParserError;
use thiserror::Error;

use crate::experiment::SpecError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid experiment specification: {0}")]
    Spec(#[from] SpecError),

    #[error("Malformed input: {0}")]
    Parser(#[from] ParserError),

    #[error("{headers} headers were supplied for a table with {columns} columns")]
    ColumnCountMismatch { headers: usize, columns: usize },

    #[error("column {column_index} has {found} rows, expected {expected}")]
    ColumnLengthMismatch {
        column_index: usize,
        expected: usize,
        found: usize,
    },

    #[error("column {column_index} has no partner; level data must come in (time, potential) column pairs")]
    UnpairedColumn { column_index: usize },

    #[error("level {id} (cycle {cycle_index}, level {level_index}) has no finite rows left to summarize")]
    EmptyLevel {
        id: usize,
        cycle_index: usize,
        level_index: usize,
    },

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV writing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Report export error: {0}")]
    Report(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
