//! Night-halt date enumeration for normalized stays.
//!
//! A stay halts overnight on a calendar day when the daily probe
//! instant (01:01) falls inside the stay, or when the next day's probe
//! does. Halt days are attributed either directly to a late-night entry
//! or to a stay carried over from an earlier day.
//!
//! The previous-day enumerator lists the nights a vehicle stood parked
//! before its revenue date, which corrects the exit-keyed halt count
//! for multi-night stays.

use crate::config::LedgerConfig;
use crate::models::{HaltDates, StayRecord};
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};

/// Fixed times that decide whether and how a day counts as a halt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HaltPolicy {
    pub probe_time: NaiveTime,
    pub direct_window_start: NaiveTime,
    pub direct_window_end: NaiveTime,
}

impl HaltPolicy {
    pub fn from_config(config: &LedgerConfig) -> Self {
        Self {
            probe_time: config.halt_probe_time,
            direct_window_start: config.direct_halt_window_start,
            direct_window_end: config.direct_halt_window_end,
        }
    }

    fn is_direct_entry_time(&self, time: NaiveTime) -> bool {
        self.direct_window_start <= time && time <= self.direct_window_end
    }

    /// Split the halt days of a stay into direct and carry-over dates
    ///
    /// Still-parked stays run until `now`. Dates come out ascending and
    /// every qualifying date lands in exactly one of the two lists.
    pub fn night_halts(&self, stay: &StayRecord, now: NaiveDateTime) -> HaltDates {
        let entry = stay.entry;
        let exit = stay.exit().unwrap_or(now);
        let direct_entry = self.is_direct_entry_time(entry.time());

        let mut halts = HaltDates::default();
        let mut current = entry.date();

        while current <= exit.date() {
            let probe = current.and_time(self.probe_time);
            let Some(next_probe) = probe.checked_add_days(Days::new(1)) else {
                break;
            };

            let probe_inside = entry <= probe && probe < exit;
            let next_probe_inside = entry < next_probe && next_probe <= exit;

            if probe_inside || next_probe_inside {
                if current == entry.date() && direct_entry {
                    halts.direct.push(current);
                } else {
                    halts.carry_over.push(current);
                }
            }

            match current.succ_opt() {
                Some(next) => current = next,
                None => break,
            }
        }

        halts
    }
}

/// Nights parked strictly before the revenue date
///
/// Walks one day at a time from a day after entry while still before
/// the exit instant. Stays without a revenue date yield nothing.
pub fn previous_day_no_exit_dates(stay: &StayRecord) -> Vec<NaiveDate> {
    let (Some(revenue), Some(exit)) = (stay.revenue_instant(), stay.exit()) else {
        return Vec::new();
    };

    let mut dates = Vec::new();
    let mut current = stay.entry.checked_add_days(Days::new(1));

    while let Some(instant) = current {
        if instant >= exit {
            break;
        }
        if instant < revenue {
            dates.push(instant.date());
        }
        current = instant.checked_add_days(Days::new(1));
    }

    dates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(value: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
    }

    fn dates(values: &[&str]) -> Vec<NaiveDate> {
        values.iter().map(|v| date(v)).collect()
    }

    fn stay(entry: &str, revenue: Option<&str>) -> StayRecord {
        StayRecord {
            station: "Vadapalani".to_string(),
            entry: ts(entry),
            revenue_date: revenue.map(date),
            amount: 0.0,
            other_payment_amount: 0.0,
            passenger_type: String::new(),
        }
    }

    fn policy() -> HaltPolicy {
        HaltPolicy::from_config(&LedgerConfig::default())
    }

    fn now() -> NaiveDateTime {
        ts("2024-03-04 12:00:00")
    }

    #[test]
    fn test_two_night_stay_entered_at_two_am() {
        let record = stay("2024-03-01 02:00:00", Some("2024-03-03"));

        let halts = policy().night_halts(&record, now());
        assert_eq!(halts.direct, dates(&["2024-03-01"]));
        assert_eq!(halts.carry_over, dates(&["2024-03-02", "2024-03-03"]));

        assert_eq!(
            previous_day_no_exit_dates(&record),
            dates(&["2024-03-02"])
        );
    }

    #[test]
    fn test_same_day_exit_has_no_halts() {
        let record = stay("2024-01-10 10:00:00", Some("2024-01-10"));

        let halts = policy().night_halts(&record, now());
        assert!(halts.direct.is_empty());
        assert!(halts.carry_over.is_empty());
        assert!(previous_day_no_exit_dates(&record).is_empty());
        assert!(record.is_same_day_exit());
        assert!(!record.is_night_halt_exit());
    }

    #[test]
    fn test_daytime_entry_overnight_is_carry_over() {
        let record = stay("2024-03-01 18:00:00", Some("2024-03-02"));

        let halts = policy().night_halts(&record, now());
        assert!(halts.direct.is_empty());
        assert_eq!(halts.carry_over, dates(&["2024-03-01", "2024-03-02"]));
        assert!(previous_day_no_exit_dates(&record).is_empty());
    }

    #[test]
    fn test_still_parked_runs_until_now() {
        let record = stay("2024-03-01 10:00:00", None);

        let halts = policy().night_halts(&record, now());
        assert!(halts.direct.is_empty());
        assert_eq!(
            halts.carry_over,
            dates(&["2024-03-01", "2024-03-02", "2024-03-03", "2024-03-04"])
        );
        assert!(previous_day_no_exit_dates(&record).is_empty());
    }

    #[test]
    fn test_still_parked_depends_only_on_injected_now() {
        let record = stay("2024-03-01 10:00:00", None);
        let earlier = ts("2024-03-02 01:01:00");

        let halts = policy().night_halts(&record, earlier);
        assert_eq!(halts.carry_over, dates(&["2024-03-01"]));

        let before_first_probe = ts("2024-03-02 00:30:00");
        assert_eq!(
            policy().night_halts(&record, before_first_probe),
            HaltDates::default()
        );
        assert_eq!(halts, policy().night_halts(&record, earlier));
    }

    #[test]
    fn test_direct_window_is_inclusive() {
        let on_start = stay("2024-03-01 01:01:00", Some("2024-03-02"));
        let on_end = stay("2024-03-01 04:29:00", Some("2024-03-02"));
        let after_end = stay("2024-03-01 04:29:01", Some("2024-03-02"));
        let before_start = stay("2024-03-01 01:00:59", Some("2024-03-02"));

        for record in [&on_start, &on_end] {
            let halts = policy().night_halts(record, now());
            assert_eq!(halts.direct, dates(&["2024-03-01"]), "{}", record.entry);
            assert_eq!(halts.carry_over, dates(&["2024-03-02"]), "{}", record.entry);
        }

        for record in [&after_end, &before_start] {
            let halts = policy().night_halts(record, now());
            assert!(halts.direct.is_empty(), "{}", record.entry);
            assert_eq!(
                halts.carry_over,
                dates(&["2024-03-01", "2024-03-02"]),
                "{}",
                record.entry
            );
        }
    }

    #[test]
    fn test_previous_day_dates_exclude_revenue_date() {
        let record = stay("2024-03-01 10:00:00", Some("2024-03-05"));

        assert_eq!(
            previous_day_no_exit_dates(&record),
            dates(&["2024-03-02", "2024-03-03", "2024-03-04"])
        );
    }

    #[test]
    fn test_direct_and_carry_over_partition_the_walk() {
        let policy = policy();

        for day in 1..=3u32 {
            for minute in (0..24 * 60).step_by(37) {
                let entry = date("2024-03-01")
                    .and_hms_opt(minute / 60, minute % 60, 0)
                    .unwrap();
                let record = StayRecord {
                    entry,
                    revenue_date: date("2024-03-01").checked_add_days(Days::new(day as u64)),
                    ..stay("2024-03-01 00:00:00", None)
                };

                let halts = policy.night_halts(&record, now());
                assert!(halts.direct.len() <= 1);
                for halt in &halts.direct {
                    assert_eq!(*halt, entry.date());
                    assert!(!halts.carry_over.contains(halt));
                }

                let mut all: Vec<_> = halts.direct.iter().chain(&halts.carry_over).collect();
                let total = all.len();
                all.sort();
                all.dedup();
                assert_eq!(all.len(), total, "duplicate halt date for {}", entry);
            }
        }
    }
}
