//! Parking Ledger Library
//!
//! Turns a parking facility ledger, one row per vehicle stay, into a
//! per-station daily report of entries, same-day and night-halt exits,
//! night halts spanning several days, revenue and passenger types.
//!
//! This library provides tools for:
//! - Reading ledgers from CSV files or spreadsheet workbooks
//! - Normalizing entries onto the 1:00 AM operational day
//! - Enumerating direct, carry-over and previous-day night halts
//! - Aggregating stays by station and date with sparse-date handling
//! - Writing the report as an xlsx workbook, CSV or Parquet

pub mod aggregator;
pub mod cli;
pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod night_halt;
pub mod normalizer;
pub mod processor;
pub mod reader;
pub mod writer;

pub use aggregator::{ReportAggregator, aggregate};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::LedgerConfig;
pub use error::{LedgerError, Result};
pub use models::{ReportRow, StationDayMetrics, StayRecord};
pub use processor::LedgerProcessor;
