//! Command-line interface components.

use crate::config::LedgerConfig;
use crate::constants::AS_OF_FORMAT;
use crate::error::Result;
use crate::models::OutputFormat;
use chrono::NaiveDateTime;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "parking-ledger")]
#[command(about = "Build a per-station daily night halt report from a parking ledger")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Ledger to read (.csv, .xlsx, .xlsm, .xls, .xlsb or .ods)
    #[arg(value_name = "LEDGER")]
    pub input_path: PathBuf,

    /// Report file (defaults to <ledger stem>_night_halt_report.csv beside the ledger)
    #[arg(short, long)]
    pub output_path: Option<PathBuf>,

    /// Workbook sheet to read (defaults to the first sheet)
    #[arg(long)]
    pub sheet: Option<String>,

    /// Report format (defaults to the output extension, else csv)
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Treat vehicles without a revenue date as parked until this instant ("YYYY-MM-DD HH:MM:SS")
    #[arg(long, value_name = "TIMESTAMP", value_parser = parse_as_of)]
    pub as_of: Option<NaiveDateTime>,

    /// Also write the raw direct and carry-over halt counts
    #[arg(long)]
    pub diagnostics: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Layer the configuration: defaults, then the config file, then flags
    pub fn load_config(&self) -> Result<LedgerConfig> {
        let mut config = match &self.config {
            Some(path) => LedgerConfig::from_file(path)?,
            None => LedgerConfig::default(),
        };

        if let Some(sheet) = &self.sheet {
            config = config.with_sheet_name(sheet.clone());
        }
        if let Some(format) = self.format {
            config = config.with_output_format(format);
        }
        if self.diagnostics {
            config = config.with_halt_diagnostics();
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_as_of(value: &str) -> std::result::Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(value, AS_OF_FORMAT)
        .map_err(|e| format!("expected \"YYYY-MM-DD HH:MM:SS\": {}", e))
}
