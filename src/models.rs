//! Core data structures and types for ledger processing.
//!
//! Defines raw ledger rows as read from the input, normalized stays,
//! the per-station daily metrics accumulator, report rows and
//! processing statistics.

use crate::constants::WORKBOOK_EXTENSIONS;
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A single input cell, typed as loosely as the source allows
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Build a cell from text, treating blank text as empty
    pub fn from_text(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(trimmed.to_string())
        }
    }

    /// Text rendering used for labels and error messages
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
            CellValue::DateTime(dt) => dt.to_string(),
        }
    }
}

/// One ledger row before normalization
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRecord {
    /// 1-based data row number in the source table
    pub row: usize,
    pub station: String,
    pub vehicle_status: String,
    pub entry: CellValue,
    pub revenue_date: CellValue,
    pub amount: CellValue,
    pub other_payment_amount: CellValue,
    pub passenger_type: String,
}

impl RawRecord {
    /// True when every cell of the row is blank, as in trailing export rows
    pub fn is_blank(&self) -> bool {
        self.station.trim().is_empty()
            && self.vehicle_status.trim().is_empty()
            && self.passenger_type.trim().is_empty()
            && [
                &self.entry,
                &self.revenue_date,
                &self.amount,
                &self.other_payment_amount,
            ]
            .iter()
            .all(|cell| matches!(cell, CellValue::Empty))
    }
}

/// A normalized parking stay
///
/// `entry` already carries the operational-day shift. The exit instant
/// is derived from the revenue date and is open when no revenue date
/// was recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct StayRecord {
    pub station: String,
    pub entry: NaiveDateTime,
    pub revenue_date: Option<NaiveDate>,
    pub amount: f64,
    pub other_payment_amount: f64,
    pub passenger_type: String,
}

impl StayRecord {
    pub fn entry_date(&self) -> NaiveDate {
        self.entry.date()
    }

    /// Revenue date as an instant at midnight
    pub fn revenue_instant(&self) -> Option<NaiveDateTime> {
        self.revenue_date.map(|d| d.and_time(NaiveTime::MIN))
    }

    /// Midnight after the revenue date; `None` while still parked
    pub fn exit(&self) -> Option<NaiveDateTime> {
        self.revenue_instant()
            .and_then(|instant| instant.checked_add_days(Days::new(1)))
    }

    pub fn is_same_day_exit(&self) -> bool {
        self.revenue_date == Some(self.entry_date())
    }

    pub fn is_night_halt_exit(&self) -> bool {
        self.revenue_date
            .is_some_and(|revenue| revenue != self.entry_date())
    }

    pub fn revenue(&self) -> f64 {
        self.amount + self.other_payment_amount
    }
}

/// Night-halt dates of one stay, split by attribution
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HaltDates {
    /// Halts caused directly by a late-night entry on its entry date
    pub direct: Vec<NaiveDate>,
    /// Halts continuing a stay that began on an earlier day
    pub carry_over: Vec<NaiveDate>,
}

/// Metrics accumulated for one (station, date) pair
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StationDayMetrics {
    pub entry_count: u32,
    pub same_day_exit_count: u32,
    pub night_halt_exit_count: u32,
    pub previous_day_no_exit_count: u32,
    pub direct_halt_count: u32,
    pub carry_over_halt_count: u32,
    pub revenue: f64,
    pub cmrl_passenger_count: u32,
    pub non_cmrl_passenger_count: u32,
}

impl StationDayMetrics {
    /// Vehicles that halted overnight, counted at exit plus still-parked nights
    pub fn night_halt_count(&self) -> u32 {
        self.night_halt_exit_count + self.previous_day_no_exit_count
    }

    /// True when every reported metric is zero
    pub fn is_empty(&self) -> bool {
        self.entry_count == 0
            && self.same_day_exit_count == 0
            && self.night_halt_exit_count == 0
            && self.night_halt_count() == 0
            && self.previous_day_no_exit_count == 0
            && self.revenue == 0.0
            && self.cmrl_passenger_count == 0
            && self.non_cmrl_passenger_count == 0
    }
}

/// One row of the final report
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub station: String,
    pub date: NaiveDate,
    pub metrics: StationDayMetrics,
}

/// Supported report formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    Parquet,
    Xlsx,
}

impl OutputFormat {
    /// Detect the report format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "csv" => Some(OutputFormat::Csv),
            "parquet" | "pq" => Some(OutputFormat::Parquet),
            "xlsx" => Some(OutputFormat::Xlsx),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Parquet => "parquet",
            OutputFormat::Xlsx => "xlsx",
        }
    }
}

/// Supported ledger input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Workbook,
}

impl InputFormat {
    /// Detect the input format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        if ext == "csv" {
            Some(InputFormat::Csv)
        } else if WORKBOOK_EXTENSIONS.contains(&ext.as_str()) {
            Some(InputFormat::Workbook)
        } else {
            None
        }
    }
}

/// Processing statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub rows_read: usize,
    pub rows_excluded: usize,
    pub rows_skipped: usize,
    pub records_normalized: usize,
    pub report_rows: usize,
    pub output_path: PathBuf,
    pub processing_time_ms: u128,
}
