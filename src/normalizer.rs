//! Row normalization for raw ledger records.
//!
//! Turns raw rows into [`StayRecord`]s: drops non-stay statuses,
//! parses the entry timestamp (fatal on failure) and the revenue date
//! (absent on failure), and applies the operational-day shift so that
//! entries before the day boundary hour belong to the previous day.

use crate::config::LedgerConfig;
use crate::constants::{MISSING_AMOUNT_MARKERS, input_columns};
use crate::error::{LedgerError, Result};
use crate::models::{CellValue, RawRecord, StayRecord};
use chrono::{Days, NaiveDate, NaiveDateTime, Timelike};
use tracing::{debug, warn};

/// Result of normalizing one raw row
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Stay(StayRecord),
    /// Vehicle status is not a parking stay
    Excluded,
    /// No station to attribute the stay to
    MissingStation,
    /// Every cell of the row is empty
    Blank,
}

/// All stays of a ledger plus the counts of rows left out
#[derive(Debug, Default)]
pub struct NormalizedLedger {
    pub stays: Vec<StayRecord>,
    pub excluded: usize,
    pub skipped: usize,
}

/// Row normalizer bound to a configuration
#[derive(Debug, Clone, Copy)]
pub struct RowNormalizer<'a> {
    config: &'a LedgerConfig,
}

impl<'a> RowNormalizer<'a> {
    pub fn new(config: &'a LedgerConfig) -> Self {
        Self { config }
    }

    /// Normalize every row, failing on the first unparseable entry timestamp
    pub fn normalize_all(&self, rows: &[RawRecord]) -> Result<NormalizedLedger> {
        let mut ledger = NormalizedLedger::default();

        for raw in rows {
            match self.normalize(raw)? {
                Normalized::Stay(stay) => ledger.stays.push(stay),
                Normalized::Excluded => ledger.excluded += 1,
                Normalized::MissingStation => {
                    warn!("Row {}: no station, stay left out of the report", raw.row);
                    ledger.skipped += 1;
                }
                Normalized::Blank => {
                    warn!("Row {}: blank row ignored", raw.row);
                    ledger.skipped += 1;
                }
            }
        }

        debug!(
            "Normalized {} stays ({} excluded by status, {} blank or without station)",
            ledger.stays.len(),
            ledger.excluded,
            ledger.skipped
        );

        Ok(ledger)
    }

    /// Normalize a single raw row
    pub fn normalize(&self, raw: &RawRecord) -> Result<Normalized> {
        if raw.is_blank() {
            return Ok(Normalized::Blank);
        }
        if self.config.is_excluded_status(raw.vehicle_status.trim()) {
            return Ok(Normalized::Excluded);
        }

        let entry = self.parse_entry(raw)?;
        let entry = self.shift_to_operational_day(entry).ok_or_else(|| {
            LedgerError::InvalidEntryTimestamp {
                row: raw.row,
                value: raw.entry.as_text(),
            }
        })?;
        let revenue_date = self.parse_revenue_date(&raw.revenue_date);

        if raw.station.trim().is_empty() {
            return Ok(Normalized::MissingStation);
        }

        Ok(Normalized::Stay(StayRecord {
            station: raw.station.trim().to_string(),
            entry,
            revenue_date,
            amount: parse_amount(raw.row, input_columns::AMOUNT, &raw.amount)?,
            other_payment_amount: parse_amount(
                raw.row,
                input_columns::OTHER_PAYMENT_AMOUNT,
                &raw.other_payment_amount,
            )?,
            passenger_type: raw.passenger_type.trim().to_string(),
        }))
    }

    fn parse_entry(&self, raw: &RawRecord) -> Result<NaiveDateTime> {
        let parsed = match &raw.entry {
            CellValue::DateTime(dt) => Some(*dt),
            CellValue::Text(text) => {
                NaiveDateTime::parse_from_str(text, &self.config.entry_timestamp_format).ok()
            }
            CellValue::Number(_) | CellValue::Empty => None,
        };

        parsed.ok_or_else(|| LedgerError::InvalidEntryTimestamp {
            row: raw.row,
            value: raw.entry.as_text(),
        })
    }

    /// Move entries before the boundary hour back one calendar day, keeping the clock time
    pub fn shift_to_operational_day(&self, entry: NaiveDateTime) -> Option<NaiveDateTime> {
        if entry.hour() < self.config.day_boundary_hour {
            entry.checked_sub_days(Days::new(1))
        } else {
            Some(entry)
        }
    }

    /// Malformed or missing revenue dates mean the vehicle has not exited
    fn parse_revenue_date(&self, cell: &CellValue) -> Option<NaiveDate> {
        match cell {
            CellValue::DateTime(dt) => Some(dt.date()),
            CellValue::Text(text) => {
                NaiveDate::parse_from_str(text, &self.config.revenue_date_format).ok()
            }
            CellValue::Number(_) | CellValue::Empty => None,
        }
    }
}

/// Blank and NA-style cells count as zero; infinite or non-numeric values are rejected
fn parse_amount(row: usize, column: &str, cell: &CellValue) -> Result<f64> {
    let invalid = || LedgerError::InvalidAmount {
        row,
        column: column.to_string(),
        value: cell.as_text(),
    };

    let value = match cell {
        CellValue::Empty => return Ok(0.0),
        CellValue::Number(n) => *n,
        CellValue::Text(text) if is_missing_marker(text) => return Ok(0.0),
        CellValue::Text(text) => text.trim().parse::<f64>().map_err(|_| invalid())?,
        CellValue::DateTime(_) => return Err(invalid()),
    };

    if value.is_nan() {
        Ok(0.0)
    } else if value.is_infinite() {
        Err(invalid())
    } else {
        Ok(value)
    }
}

fn is_missing_marker(text: &str) -> bool {
    let text = text.trim();
    MISSING_AMOUNT_MARKERS
        .iter()
        .any(|marker| text.eq_ignore_ascii_case(marker))
}
