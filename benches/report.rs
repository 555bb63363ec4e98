use chrono::{Days, NaiveDate, NaiveDateTime};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use parking_ledger::{LedgerConfig, StayRecord, aggregate};

const STATIONS: &[&str] = &["Alandur", "Guindy", "Vadapalani", "Ashok Nagar", "Koyambedu"];

fn synthetic_ledger(stays: usize) -> Vec<StayRecord> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    (0..stays)
        .map(|i| {
            let entry_day = start + Days::new((i % 90) as u64);
            let entry = entry_day
                .and_hms_opt((i % 24) as u32, ((i * 7) % 60) as u32, 0)
                .unwrap();
            let revenue_date = match i % 10 {
                0 => None,
                n => Some(entry_day + Days::new((n % 4) as u64)),
            };
            StayRecord {
                station: STATIONS[i % STATIONS.len()].to_string(),
                entry,
                revenue_date,
                amount: 20.0,
                other_payment_amount: (i % 3) as f64,
                passenger_type: if i % 2 == 0 {
                    "CMRL Passengers".to_string()
                } else {
                    "Non CMRL Passengers".to_string()
                },
            }
        })
        .collect()
}

fn bench_aggregate(c: &mut Criterion) {
    let config = LedgerConfig::default();
    let now = NaiveDateTime::parse_from_str("2024-04-15 12:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
    let stays = synthetic_ledger(50_000);

    c.bench_function("aggregate_50k_stays", |b| {
        b.iter(|| aggregate(black_box(&config), black_box(&stays), now))
    });
}

criterion_group!(benches, bench_aggregate);
criterion_main!(benches);
