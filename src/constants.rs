//! Application constants for the parking ledger report
//!
//! Column names of the input ledger and the output report, timestamp
//! formats and the fixed night-halt policy times.

// =============================================================================
// Input Ledger Columns
// =============================================================================

pub mod input_columns {
    pub const STATION: &str = "Station";
    pub const VEHICLE_STATUS: &str = "Vehicle Status";
    pub const ENTRY_DATE: &str = "Entry Date";
    pub const REVENUE_DATE: &str = "Revenue Date";
    pub const AMOUNT: &str = "Amount";
    pub const OTHER_PAYMENT_AMOUNT: &str = "Other Payment Amount";
    pub const PASSENGER_TYPE: &str = "Passenger Type";

    /// Every column the normalizer reads
    pub const REQUIRED: &[&str] = &[
        STATION,
        VEHICLE_STATUS,
        ENTRY_DATE,
        REVENUE_DATE,
        AMOUNT,
        OTHER_PAYMENT_AMOUNT,
        PASSENGER_TYPE,
    ];
}

// =============================================================================
// Output Report Columns
// =============================================================================

pub mod report_columns {
    pub const STATION: &str = "Station";
    pub const DATE: &str = "Date";
    pub const ENTRY_COUNT: &str = "Entry Count";
    pub const SAME_DAY_EXIT_COUNT: &str = "Same Day Exit Count";
    pub const NIGHT_HALT_EXIT_COUNT: &str = "Previous day entry today exit";
    pub const NIGHT_HALT_COUNT: &str = "Night Halt Count";
    pub const PREVIOUS_DAY_NO_EXIT_COUNT: &str = "Previous Day entry no exit";
    pub const REVENUE: &str = "Revenue";
    pub const CMRL_PASSENGER_COUNT: &str = "CMRL Passengers Count";
    pub const NON_CMRL_PASSENGER_COUNT: &str = "Non-CMRL Passengers Count";

    /// Diagnostic columns, written only on request
    pub const DIRECT_HALT_COUNT: &str = "Night Halt Dates Count";
    pub const CARRY_OVER_HALT_COUNT: &str = "Previous Night Halt Dates Count";
}

// =============================================================================
// Ledger Literals
// =============================================================================

/// Vehicle statuses that are not parking stays
pub const EXCLUDED_VEHICLE_STATUSES: &[&str] = &["Pass Sale", "Entry"];

/// Amount cell spellings read as a missing amount, compared case-insensitively
pub const MISSING_AMOUNT_MARKERS: &[&str] = &[
    "nan", "-nan", "n/a", "#n/a", "na", "#na", "<na>", "null", "none",
];

pub const CMRL_PASSENGERS: &str = "CMRL Passengers";
pub const NON_CMRL_PASSENGERS: &str = "Non CMRL Passengers";

// =============================================================================
// Timestamp Formats
// =============================================================================

/// Entry timestamps: day/month/year with a 12-hour clock
pub const ENTRY_TIMESTAMP_FORMAT: &str = "%d/%m/%Y %I:%M:%S %p";

/// Revenue dates carry no time component
pub const REVENUE_DATE_FORMAT: &str = "%d/%m/%Y";

/// Format accepted by `--as-of`
pub const AS_OF_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// =============================================================================
// Night Halt Policy
// =============================================================================

pub mod halt_policy {
    /// The operational day starts at this hour, not at midnight
    pub const DAY_BOUNDARY_HOUR: u32 = 1;

    /// Clock time at which a parked vehicle counts as halting overnight
    pub const PROBE_HOUR: u32 = 1;
    pub const PROBE_MINUTE: u32 = 1;

    /// Entries inside this window (inclusive) halt on their own entry date
    pub const DIRECT_WINDOW_START: (u32, u32) = (1, 1);
    pub const DIRECT_WINDOW_END: (u32, u32) = (4, 29);
}

// =============================================================================
// Output Defaults
// =============================================================================

/// Suffix appended to the input stem when no output path is given
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_night_halt_report";

/// Worksheet holding the report in workbook output
pub const REPORT_SHEET_NAME: &str = "Night Halt Report";

/// Number format of the Date column in workbook output
pub const REPORT_DATE_NUM_FORMAT: &str = "yyyy-mm-dd";

/// Workbook extensions handled by the spreadsheet reader
pub const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_columns_are_unique() {
        let mut columns = input_columns::REQUIRED.to_vec();
        columns.sort_unstable();
        columns.dedup();
        assert_eq!(columns.len(), input_columns::REQUIRED.len());
    }

    #[test]
    fn test_direct_window_is_ordered() {
        assert!(halt_policy::DIRECT_WINDOW_START < halt_policy::DIRECT_WINDOW_END);
        assert!(halt_policy::DAY_BOUNDARY_HOUR < 24);
    }
}
