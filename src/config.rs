//! Configuration management and validation.
//!
//! Provides the configuration structure for ledger parsing rules,
//! the night-halt policy times and report output settings. Values
//! layer as defaults, then an optional TOML file, then CLI overrides.

use crate::constants::{self, halt_policy};
use crate::error::{LedgerError, Result};
use crate::models::OutputFormat;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Global configuration for ledger processing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Vehicle statuses dropped before any processing
    pub excluded_statuses: Vec<String>,

    /// Passenger type label counted in the CMRL column
    pub cmrl_passenger_type: String,

    /// Passenger type label counted in the Non-CMRL column
    pub non_cmrl_passenger_type: String,

    /// chrono format of the entry timestamp column
    pub entry_timestamp_format: String,

    /// chrono format of the revenue date column
    pub revenue_date_format: String,

    /// Entries earlier than this hour belong to the previous operational day
    pub day_boundary_hour: u32,

    /// Clock time probed on each day of a stay
    pub halt_probe_time: NaiveTime,

    /// Start of the direct-halt entry window (inclusive)
    pub direct_halt_window_start: NaiveTime,

    /// End of the direct-halt entry window (inclusive)
    pub direct_halt_window_end: NaiveTime,

    /// Workbook sheet to read; the first sheet when unset
    pub sheet_name: Option<String>,

    /// Report format; inferred from the output extension when unset
    pub output_format: Option<OutputFormat>,

    /// Also write the raw direct and carry-over halt counts
    pub include_halt_diagnostics: bool,
}

fn policy_time((hour, minute): (u32, u32)) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            excluded_statuses: constants::EXCLUDED_VEHICLE_STATUSES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            cmrl_passenger_type: constants::CMRL_PASSENGERS.to_string(),
            non_cmrl_passenger_type: constants::NON_CMRL_PASSENGERS.to_string(),
            entry_timestamp_format: constants::ENTRY_TIMESTAMP_FORMAT.to_string(),
            revenue_date_format: constants::REVENUE_DATE_FORMAT.to_string(),
            day_boundary_hour: halt_policy::DAY_BOUNDARY_HOUR,
            halt_probe_time: policy_time((halt_policy::PROBE_HOUR, halt_policy::PROBE_MINUTE)),
            direct_halt_window_start: policy_time(halt_policy::DIRECT_WINDOW_START),
            direct_halt_window_end: policy_time(halt_policy::DIRECT_WINDOW_END),
            sheet_name: None,
            output_format: None,
            include_halt_diagnostics: false,
        }
    }
}

impl LedgerConfig {
    /// Load configuration from a TOML file, filling gaps with defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| LedgerError::Configuration {
            message: format!("cannot read config file {}: {}", path.display(), e),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| LedgerError::Configuration {
            message: format!("invalid config file {}: {}", path.display(), e),
        })?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Select the workbook sheet to read
    pub fn with_sheet_name(mut self, sheet_name: impl Into<String>) -> Self {
        self.sheet_name = Some(sheet_name.into());
        self
    }

    /// Force the report format
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    /// Write the raw halt counts alongside the standard columns
    pub fn with_halt_diagnostics(mut self) -> Self {
        self.include_halt_diagnostics = true;
        self
    }

    /// Set the operational day boundary hour
    pub fn with_day_boundary_hour(mut self, hour: u32) -> Self {
        self.day_boundary_hour = hour;
        self
    }

    /// Whether a record with this status is dropped before processing
    pub fn is_excluded_status(&self, status: &str) -> bool {
        self.excluded_statuses.iter().any(|s| s == status)
    }

    /// Check the configuration for values the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.day_boundary_hour > 23 {
            return Err(LedgerError::Configuration {
                message: format!(
                    "day_boundary_hour must be between 0 and 23, got {}",
                    self.day_boundary_hour
                ),
            });
        }

        if self.direct_halt_window_start > self.direct_halt_window_end {
            return Err(LedgerError::Configuration {
                message: format!(
                    "direct halt window is inverted: {} > {}",
                    self.direct_halt_window_start, self.direct_halt_window_end
                ),
            });
        }

        if self.cmrl_passenger_type == self.non_cmrl_passenger_type {
            return Err(LedgerError::Configuration {
                message: format!(
                    "CMRL and Non-CMRL passenger types must differ, both are '{}'",
                    self.cmrl_passenger_type
                ),
            });
        }

        if self.entry_timestamp_format.trim().is_empty()
            || self.revenue_date_format.trim().is_empty()
        {
            return Err(LedgerError::Configuration {
                message: "timestamp formats must not be empty".to_string(),
            });
        }

        Ok(())
    }
}
