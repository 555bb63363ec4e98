//! Report writing module.
//!
//! Builds a polars DataFrame from the aggregated report rows and writes
//! it as CSV or as Snappy-compressed Parquet, or writes the same table
//! as a typed worksheet of an `.xlsx` workbook.

use crate::constants::{REPORT_DATE_NUM_FORMAT, REPORT_SHEET_NAME, report_columns};
use crate::error::Result;
use crate::models::{OutputFormat, ReportRow, StationDayMetrics};
use chrono::{Datelike, NaiveDate};
use polars::prelude::{
    Column, CsvWriter, DataFrame, ParquetCompression, ParquetWriter, SerWriter,
};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use std::fs::{self, File};
use std::path::Path;
use tracing::debug;

/// How a metric column reads its value off the daily metrics
#[derive(Clone, Copy)]
enum Metric {
    Count(fn(&StationDayMetrics) -> u32),
    Amount(fn(&StationDayMetrics) -> f64),
}

/// Metric columns in report order, after Station and Date
fn metric_columns(include_diagnostics: bool) -> Vec<(&'static str, Metric)> {
    let mut columns: Vec<(&'static str, Metric)> = vec![
        (report_columns::ENTRY_COUNT, Metric::Count(|m| m.entry_count)),
        (
            report_columns::SAME_DAY_EXIT_COUNT,
            Metric::Count(|m| m.same_day_exit_count),
        ),
        (
            report_columns::NIGHT_HALT_EXIT_COUNT,
            Metric::Count(|m| m.night_halt_exit_count),
        ),
        (
            report_columns::NIGHT_HALT_COUNT,
            Metric::Count(|m| m.night_halt_count()),
        ),
        (
            report_columns::PREVIOUS_DAY_NO_EXIT_COUNT,
            Metric::Count(|m| m.previous_day_no_exit_count),
        ),
        (report_columns::REVENUE, Metric::Amount(|m| m.revenue)),
        (
            report_columns::CMRL_PASSENGER_COUNT,
            Metric::Count(|m| m.cmrl_passenger_count),
        ),
        (
            report_columns::NON_CMRL_PASSENGER_COUNT,
            Metric::Count(|m| m.non_cmrl_passenger_count),
        ),
    ];

    if include_diagnostics {
        columns.push((
            report_columns::DIRECT_HALT_COUNT,
            Metric::Count(|m| m.direct_halt_count),
        ));
        columns.push((
            report_columns::CARRY_OVER_HALT_COUNT,
            Metric::Count(|m| m.carry_over_halt_count),
        ));
    }

    columns
}

/// Build the report table, standard columns first
pub fn report_frame(rows: &[ReportRow], include_diagnostics: bool) -> Result<DataFrame> {
    let stations: Vec<&str> = rows.iter().map(|r| r.station.as_str()).collect();
    let dates: Vec<NaiveDate> = rows.iter().map(|r| r.date).collect();

    let mut columns = vec![
        Column::new(report_columns::STATION.into(), stations),
        Column::new(report_columns::DATE.into(), dates),
    ];

    for (name, metric) in metric_columns(include_diagnostics) {
        let column = match metric {
            Metric::Count(read) => {
                let values: Vec<u32> = rows.iter().map(|r| read(&r.metrics)).collect();
                Column::new(name.into(), values)
            }
            Metric::Amount(read) => {
                let values: Vec<f64> = rows.iter().map(|r| read(&r.metrics)).collect();
                Column::new(name.into(), values)
            }
        };
        columns.push(column);
    }

    Ok(DataFrame::new(columns)?)
}

/// Write the report as a single worksheet with typed cells
pub fn write_workbook(rows: &[ReportRow], path: &Path, include_diagnostics: bool) -> Result<()> {
    let columns = metric_columns(include_diagnostics);
    let header_format = Format::new().set_bold();
    let date_format = Format::new().set_num_format(REPORT_DATE_NUM_FORMAT);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(REPORT_SHEET_NAME)?;

    worksheet.write_string_with_format(0, 0, report_columns::STATION, &header_format)?;
    worksheet.write_string_with_format(0, 1, report_columns::DATE, &header_format)?;
    for (col, (name, _)) in (2u16..).zip(&columns) {
        worksheet.write_string_with_format(0, col, *name, &header_format)?;
    }

    for (row_num, row) in (1u32..).zip(rows) {
        let date = ExcelDateTime::from_ymd(
            row.date.year() as u16,
            row.date.month() as u8,
            row.date.day() as u8,
        )?;

        worksheet.write_string(row_num, 0, row.station.as_str())?;
        worksheet.write_datetime_with_format(row_num, 1, &date, &date_format)?;
        for (col, (_, metric)) in (2u16..).zip(&columns) {
            let value = match metric {
                Metric::Count(read) => f64::from(read(&row.metrics)),
                Metric::Amount(read) => read(&row.metrics),
            };
            worksheet.write_number(row_num, col, value)?;
        }
    }

    worksheet.autofit();
    workbook.save(path)?;
    Ok(())
}

/// Write the report to `path`, creating parent directories as needed
pub fn write_report(
    rows: &[ReportRow],
    path: &Path,
    format: OutputFormat,
    include_diagnostics: bool,
) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    match format {
        OutputFormat::Csv => {
            let mut df = report_frame(rows, include_diagnostics)?;
            let mut file = File::create(path)?;
            CsvWriter::new(&mut file)
                .include_header(true)
                .finish(&mut df)?;
        }
        OutputFormat::Parquet => {
            let mut df = report_frame(rows, include_diagnostics)?;
            let file = File::create(path)?;
            ParquetWriter::new(file)
                .with_compression(ParquetCompression::Snappy)
                .finish(&mut df)?;
        }
        OutputFormat::Xlsx => write_workbook(rows, path, include_diagnostics)?,
    }

    debug!(
        "Wrote {} report rows as {:?} to {}",
        rows.len(),
        format,
        path.display()
    );
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{DataType as _, Reader, open_workbook_auto};
    use polars::prelude::{ParquetReader, SerReader};
    use tempfile::TempDir;

    fn sample_rows() -> Vec<ReportRow> {
        vec![
            ReportRow {
                station: "Alandur".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                metrics: StationDayMetrics {
                    entry_count: 2,
                    same_day_exit_count: 1,
                    cmrl_passenger_count: 2,
                    direct_halt_count: 1,
                    ..Default::default()
                },
            },
            ReportRow {
                station: "Alandur".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
                metrics: StationDayMetrics {
                    night_halt_exit_count: 1,
                    previous_day_no_exit_count: 2,
                    revenue: 45.5,
                    ..Default::default()
                },
            },
        ]
    }

    #[test]
    fn test_report_frame_columns() {
        let df = report_frame(&sample_rows(), false).unwrap();

        let names: Vec<&str> = df.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Station",
                "Date",
                "Entry Count",
                "Same Day Exit Count",
                "Previous day entry today exit",
                "Night Halt Count",
                "Previous Day entry no exit",
                "Revenue",
                "CMRL Passengers Count",
                "Non-CMRL Passengers Count",
            ]
        );
        assert_eq!(df.height(), 2);

        let night_halts = df.column("Night Halt Count").unwrap().u32().unwrap();
        assert_eq!(night_halts.get(0), Some(0));
        assert_eq!(night_halts.get(1), Some(3));
    }

    #[test]
    fn test_diagnostic_columns_are_optional() {
        let df = report_frame(&sample_rows(), true).unwrap();

        assert_eq!(df.width(), 12);
        let direct = df.column("Night Halt Dates Count").unwrap().u32().unwrap();
        assert_eq!(direct.get(0), Some(1));
    }

    #[test]
    fn test_write_csv_report() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("report.csv");

        let written = write_report(&sample_rows(), &path, OutputFormat::Csv, false).unwrap();
        assert_eq!(written, 2);

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next(),
            Some(
                "Station,Date,Entry Count,Same Day Exit Count,Previous day entry today exit,Night Halt Count,Previous Day entry no exit,Revenue,CMRL Passengers Count,Non-CMRL Passengers Count"
            )
        );
        assert!(lines.next().unwrap().starts_with("Alandur,2024-03-01,2,1,0,0,0,"));
        assert!(lines.next().unwrap().starts_with("Alandur,2024-03-02,0,0,1,3,2,45.5"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_write_parquet_report() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("report.parquet");

        write_report(&sample_rows(), &path, OutputFormat::Parquet, false).unwrap();

        let df = ParquetReader::new(File::open(&path).unwrap())
            .finish()
            .unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 10);
        let revenue = df.column("Revenue").unwrap().f64().unwrap();
        assert_eq!(revenue.get(1), Some(45.5));
    }

    #[test]
    fn test_empty_report_keeps_header() {
        let df = report_frame(&[], false).unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), 10);
    }

    #[test]
    fn test_write_xlsx_report() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out").join("report.xlsx");

        let written = write_report(&sample_rows(), &path, OutputFormat::Xlsx, false).unwrap();
        assert_eq!(written, 2);

        let mut workbook = open_workbook_auto(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["Night Halt Report".to_string()]);
        let range = workbook.worksheet_range("Night Halt Report").unwrap();

        assert_eq!(range.height(), 3);
        assert_eq!(range.width(), 10);

        let header: Vec<String> = range.rows().next().unwrap().iter().map(|c| c.to_string()).collect();
        assert_eq!(header[0], "Station");
        assert_eq!(header[1], "Date");
        assert_eq!(header[7], "Revenue");
        assert_eq!(header[9], "Non-CMRL Passengers Count");

        let cell = |row: u32, col: u32| range.get_value((row, col)).unwrap();

        assert_eq!(cell(1, 0).get_string(), Some("Alandur"));
        assert_eq!(cell(1, 1).as_date(), NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(cell(2, 1).as_date(), NaiveDate::from_ymd_opt(2024, 3, 2));
        assert_eq!(cell(1, 2).as_f64(), Some(2.0));
        assert_eq!(cell(2, 5).as_f64(), Some(3.0));
        assert_eq!(cell(2, 7).as_f64(), Some(45.5));
    }

    #[test]
    fn test_xlsx_report_with_diagnostics() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("report.xlsx");

        write_report(&sample_rows(), &path, OutputFormat::Xlsx, true).unwrap();

        let mut workbook = open_workbook_auto(&path).unwrap();
        let range = workbook.worksheet_range("Night Halt Report").unwrap();
        assert_eq!(range.width(), 12);
        assert_eq!(
            range.get_value((0, 10)).unwrap().get_string(),
            Some("Night Halt Dates Count")
        );
        assert_eq!(range.get_value((1, 10)).unwrap().as_f64(), Some(1.0));
    }
}
