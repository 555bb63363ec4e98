//! Main processing engine.
//!
//! Orchestrates the complete report workflow: ledger reading, row
//! normalization, night-halt enumeration, station/date aggregation and
//! report output, with a terminal summary of what was processed.

use crate::aggregator::ReportAggregator;
use crate::clock::{Clock, SystemClock};
use crate::config::LedgerConfig;
use crate::constants::DEFAULT_OUTPUT_SUFFIX;
use crate::error::{LedgerError, Result};
use crate::models::{OutputFormat, ProcessingStats, RawRecord, ReportRow};
use crate::normalizer::RowNormalizer;
use crate::reader::read_ledger;
use crate::writer::write_report;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Aggregated report plus the row accounting behind it
#[derive(Debug, Default)]
pub struct LedgerReport {
    pub rows: Vec<ReportRow>,
    pub records_normalized: usize,
    pub rows_excluded: usize,
    pub rows_skipped: usize,
}

/// Main processor for ledger report generation
pub struct LedgerProcessor {
    input_path: PathBuf,
    output_path: Option<PathBuf>,
    config: LedgerConfig,
    clock: Box<dyn Clock>,
}

impl LedgerProcessor {
    /// Create a new processor for the ledger at `input_path`
    pub fn new(input_path: PathBuf, output_path: Option<PathBuf>) -> Result<Self> {
        if !input_path.exists() {
            return Err(LedgerError::InputNotFound { path: input_path });
        }

        Ok(Self {
            input_path,
            output_path,
            config: LedgerConfig::default(),
            clock: Box::new(SystemClock),
        })
    }

    /// Configure the processor
    pub fn with_config(mut self, config: LedgerConfig) -> Self {
        self.config = config;
        self
    }

    /// Pin the instant used for vehicles that have not exited
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Report format: configured, else from the output extension, else CSV
    pub fn output_format(&self) -> OutputFormat {
        self.config
            .output_format
            .or_else(|| self.output_path.as_deref().and_then(OutputFormat::from_path))
            .unwrap_or(OutputFormat::Csv)
    }

    /// Output path, defaulting to `<input stem>_night_halt_report.<ext>` beside the input
    pub fn output_path(&self) -> PathBuf {
        match &self.output_path {
            Some(path) => path.clone(),
            None => default_output_path(&self.input_path, self.output_format()),
        }
    }

    /// Run the pure pipeline over rows that were already read
    pub fn build_report(&self, rows: &[RawRecord]) -> Result<LedgerReport> {
        let ledger = RowNormalizer::new(&self.config).normalize_all(rows)?;

        let now = self.clock.now();
        debug!("Closing open stays at {}", now);

        let mut aggregator = ReportAggregator::new(&self.config, now);
        aggregator.extend(&ledger.stays);

        Ok(LedgerReport {
            rows: aggregator.finish(),
            records_normalized: ledger.stays.len(),
            rows_excluded: ledger.excluded,
            rows_skipped: ledger.skipped,
        })
    }

    /// Main processing entry point
    pub fn run(&self) -> Result<ProcessingStats> {
        let start_time = Instant::now();
        let output_path = self.output_path();
        let format = self.output_format();

        println!("{}", "Starting night halt report".bright_green().bold());
        println!(
            "  {} {}",
            "Ledger:".bright_cyan(),
            self.input_path.display()
        );
        println!("  {} {}", "Output:".bright_cyan(), output_path.display());

        info!("Reading ledger {}", self.input_path.display());
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message("Reading ledger...");
        spinner.enable_steady_tick(Duration::from_millis(100));

        let rows = read_ledger(&self.input_path, self.config.sheet_name.as_deref());
        spinner.finish_and_clear();
        let rows = rows?;

        let report = self.build_report(&rows)?;
        let written = write_report(
            &report.rows,
            &output_path,
            format,
            self.config.include_halt_diagnostics,
        )?;

        let stats = ProcessingStats {
            rows_read: rows.len(),
            rows_excluded: report.rows_excluded,
            rows_skipped: report.rows_skipped,
            records_normalized: report.records_normalized,
            report_rows: written,
            output_path,
            processing_time_ms: start_time.elapsed().as_millis(),
        };

        info!(
            "Report finished: {} stays into {} rows",
            stats.records_normalized, stats.report_rows
        );
        print_summary(&stats);

        Ok(stats)
    }
}

fn default_output_path(input_path: &Path, format: OutputFormat) -> PathBuf {
    let stem = input_path
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();
    input_path.with_file_name(format!(
        "{}{}.{}",
        stem,
        DEFAULT_OUTPUT_SUFFIX,
        format.extension()
    ))
}

fn print_summary(stats: &ProcessingStats) {
    println!("\n{}", "Processing Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        stats.processing_time_ms.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Rows read:".bright_cyan(),
        stats.rows_read.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Excluded by status:".bright_cyan(),
        stats.rows_excluded.to_string().bright_white()
    );
    if stats.rows_skipped > 0 {
        println!(
            "  {} {}",
            "Skipped (blank or no station):".bright_red(),
            stats.rows_skipped.to_string().bright_red().bold()
        );
    }
    println!(
        "  {} {}",
        "Stays processed:".bright_cyan(),
        stats.records_normalized.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Report rows:".bright_cyan(),
        stats.report_rows.to_string().bright_white().bold()
    );
}
