//! Error handling for ledger processing operations.
//!
//! Provides error types with context for input reading, row
//! normalization, configuration and report writing failures.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Workbook writer error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Input file not found at path: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Unsupported input format for file: {path}")]
    UnsupportedInput { path: PathBuf },

    #[error("Workbook error in file: {path} - {reason}")]
    Workbook { path: PathBuf, reason: String },

    #[error("Required column '{column}' is missing from the input")]
    MissingColumn { column: String },

    #[error("Row {row}: cannot parse entry timestamp '{value}'")]
    InvalidEntryTimestamp { row: usize, value: String },

    #[error("Row {row}: column '{column}' holds a non-numeric amount '{value}'")]
    InvalidAmount {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

pub type Result<T> = std::result::Result<T, LedgerError>;
