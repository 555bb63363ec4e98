//! Ledger input reading.
//!
//! Loads the ledger table from CSV (through polars, every column read
//! as text) or from a spreadsheet workbook (through calamine) and maps
//! the required columns into [`RawRecord`]s. Typed workbook cells are
//! kept typed so native date cells need no text parsing.

use crate::constants::input_columns;
use crate::error::{LedgerError, Result};
use crate::models::{CellValue, InputFormat, RawRecord};
use calamine::{Data, DataType as _, Reader, open_workbook_auto};
use polars::prelude::{CsvReadOptions, DataFrame, SerReader, StringChunked};
use std::path::Path;
use tracing::debug;

/// Read the ledger at `path`, dispatching on its extension
pub fn read_ledger(path: &Path, sheet_name: Option<&str>) -> Result<Vec<RawRecord>> {
    if !path.exists() {
        return Err(LedgerError::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    let records = match InputFormat::from_path(path) {
        Some(InputFormat::Csv) => read_csv_ledger(path)?,
        Some(InputFormat::Workbook) => read_workbook_ledger(path, sheet_name)?,
        None => {
            return Err(LedgerError::UnsupportedInput {
                path: path.to_path_buf(),
            });
        }
    };

    debug!("Read {} ledger rows from {}", records.len(), path.display());
    Ok(records)
}

/// Read a CSV ledger with a header row
pub fn read_csv_ledger(path: &Path) -> Result<Vec<RawRecord>> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    records_from_frame(&df)
}

/// Fail on the first required column absent from `headers`
fn check_required_columns<S: AsRef<str>>(headers: &[S]) -> Result<()> {
    for &required in input_columns::REQUIRED {
        if !headers.iter().any(|h| h.as_ref() == required) {
            return Err(LedgerError::MissingColumn {
                column: required.to_string(),
            });
        }
    }
    Ok(())
}

fn text_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a StringChunked> {
    let column = df
        .column(name)
        .map_err(|_| LedgerError::MissingColumn {
            column: name.to_string(),
        })?;
    Ok(column.str()?)
}

/// Map a text-typed frame onto raw records
pub fn records_from_frame(df: &DataFrame) -> Result<Vec<RawRecord>> {
    check_required_columns(&df.get_column_names())?;

    let station = text_column(df, input_columns::STATION)?;
    let status = text_column(df, input_columns::VEHICLE_STATUS)?;
    let entry = text_column(df, input_columns::ENTRY_DATE)?;
    let revenue = text_column(df, input_columns::REVENUE_DATE)?;
    let amount = text_column(df, input_columns::AMOUNT)?;
    let other_amount = text_column(df, input_columns::OTHER_PAYMENT_AMOUNT)?;
    let passenger = text_column(df, input_columns::PASSENGER_TYPE)?;

    let text = |ca: &StringChunked, i: usize| ca.get(i).unwrap_or_default().trim().to_string();
    let cell = |ca: &StringChunked, i: usize| CellValue::from_text(ca.get(i).unwrap_or_default());

    let records = (0..df.height())
        .map(|i| RawRecord {
            row: i + 1,
            station: text(station, i),
            vehicle_status: text(status, i),
            entry: cell(entry, i),
            revenue_date: cell(revenue, i),
            amount: cell(amount, i),
            other_payment_amount: cell(other_amount, i),
            passenger_type: text(passenger, i),
        })
        .collect();

    Ok(records)
}

/// Read one sheet of a workbook; the first row holds the column names
pub fn read_workbook_ledger(path: &Path, sheet_name: Option<&str>) -> Result<Vec<RawRecord>> {
    let workbook_error = |reason: String| LedgerError::Workbook {
        path: path.to_path_buf(),
        reason,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| workbook_error(e.to_string()))?;

    let sheet = match sheet_name {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| workbook_error("workbook has no sheets".to_string()))?,
    };

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| workbook_error(format!("sheet '{}': {}", sheet, e)))?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Err(LedgerError::MissingColumn {
            column: input_columns::STATION.to_string(),
        });
    };

    let headers: Vec<String> = header
        .iter()
        .map(|c| cell_value(c).as_text())
        .collect();
    check_required_columns(&headers)?;

    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| LedgerError::MissingColumn {
                column: name.to_string(),
            })
    };

    let station = position(input_columns::STATION)?;
    let status = position(input_columns::VEHICLE_STATUS)?;
    let entry = position(input_columns::ENTRY_DATE)?;
    let revenue = position(input_columns::REVENUE_DATE)?;
    let amount = position(input_columns::AMOUNT)?;
    let other_amount = position(input_columns::OTHER_PAYMENT_AMOUNT)?;
    let passenger = position(input_columns::PASSENGER_TYPE)?;

    debug!("Reading sheet '{}' of {}", sheet, path.display());

    let records = rows
        .enumerate()
        .map(|(i, row)| {
            let cell = |idx: usize| row.get(idx).map(cell_value).unwrap_or_default();
            RawRecord {
                row: i + 1,
                station: cell(station).as_text(),
                vehicle_status: cell(status).as_text(),
                entry: cell(entry),
                revenue_date: cell(revenue),
                amount: cell(amount),
                other_payment_amount: cell(other_amount),
                passenger_type: cell(passenger).as_text(),
            }
        })
        .collect();

    Ok(records)
}

/// Convert a workbook cell, keeping numbers and date/times typed
fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::from_text(s),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_datetime()
            .map(CellValue::DateTime)
            .unwrap_or(CellValue::Empty),
        other => CellValue::from_text(&other.to_string()),
    }
}
