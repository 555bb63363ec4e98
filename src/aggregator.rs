//! Per-station, per-date aggregation of normalized stays.
//!
//! Each stay contributes once to an accumulator keyed by station and
//! date: entry-keyed counts on its entry date, exit-keyed counts and
//! revenue on its revenue date, and one increment per enumerated halt
//! date. Stations keep their first-seen order and dates sort within a
//! station, so any metric alone is enough to bring a date into the
//! report. Dates whose reported metrics are all zero are dropped.

use crate::config::LedgerConfig;
use crate::models::{ReportRow, StationDayMetrics, StayRecord};
use crate::night_halt::{HaltPolicy, previous_day_no_exit_dates};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

#[derive(Debug)]
struct StationDays {
    station: String,
    days: BTreeMap<NaiveDate, StationDayMetrics>,
}

/// Accumulates stays into station/date metrics
#[derive(Debug)]
pub struct ReportAggregator<'a> {
    config: &'a LedgerConfig,
    policy: HaltPolicy,
    now: NaiveDateTime,
    stations: Vec<StationDays>,
    index: HashMap<String, usize>,
}

impl<'a> ReportAggregator<'a> {
    /// `now` closes the stays of vehicles that are still parked
    pub fn new(config: &'a LedgerConfig, now: NaiveDateTime) -> Self {
        Self {
            config,
            policy: HaltPolicy::from_config(config),
            now,
            stations: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn station_days(&mut self, station: &str) -> &mut BTreeMap<NaiveDate, StationDayMetrics> {
        let position = match self.index.get(station) {
            Some(&position) => position,
            None => {
                self.stations.push(StationDays {
                    station: station.to_string(),
                    days: BTreeMap::new(),
                });
                self.index
                    .insert(station.to_string(), self.stations.len() - 1);
                self.stations.len() - 1
            }
        };
        &mut self.stations[position].days
    }

    /// Fold one stay into the accumulator
    pub fn add(&mut self, stay: &StayRecord) {
        let halts = self.policy.night_halts(stay, self.now);
        let previous_day_dates = previous_day_no_exit_dates(stay);
        let is_cmrl = stay.passenger_type == self.config.cmrl_passenger_type;
        let is_non_cmrl = stay.passenger_type == self.config.non_cmrl_passenger_type;

        let days = self.station_days(&stay.station);

        let on_entry = days.entry(stay.entry_date()).or_default();
        on_entry.entry_count += 1;
        if stay.is_same_day_exit() {
            on_entry.same_day_exit_count += 1;
        }
        if is_cmrl {
            on_entry.cmrl_passenger_count += 1;
        }
        if is_non_cmrl {
            on_entry.non_cmrl_passenger_count += 1;
        }

        if let Some(revenue_date) = stay.revenue_date {
            let on_revenue = days.entry(revenue_date).or_default();
            on_revenue.revenue += stay.revenue();
            if stay.is_night_halt_exit() {
                on_revenue.night_halt_exit_count += 1;
            }
        }

        for date in halts.direct {
            days.entry(date).or_default().direct_halt_count += 1;
        }
        for date in halts.carry_over {
            days.entry(date).or_default().carry_over_halt_count += 1;
        }
        for date in previous_day_dates {
            days.entry(date).or_default().previous_day_no_exit_count += 1;
        }
    }

    /// Fold a batch of stays in order
    pub fn extend<'s>(&mut self, stays: impl IntoIterator<Item = &'s StayRecord>) {
        for stay in stays {
            self.add(stay);
        }
    }

    /// Emit report rows, dropping dates where every reported metric is zero
    pub fn finish(self) -> Vec<ReportRow> {
        let mut dropped = 0usize;
        let mut rows = Vec::new();

        for StationDays { station, days } in self.stations {
            for (date, metrics) in days {
                if metrics.is_empty() {
                    dropped += 1;
                    continue;
                }
                rows.push(ReportRow {
                    station: station.clone(),
                    date,
                    metrics,
                });
            }
        }

        debug!(
            "Aggregated {} report rows ({} all-zero station days dropped)",
            rows.len(),
            dropped
        );
        rows
    }
}

/// Aggregate stays into report rows in one call
pub fn aggregate(config: &LedgerConfig, stays: &[StayRecord], now: NaiveDateTime) -> Vec<ReportRow> {
    let mut aggregator = ReportAggregator::new(config, now);
    aggregator.extend(stays);
    aggregator.finish()
}
