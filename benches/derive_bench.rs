//! Benchmarks for the derived view pipeline
//!
//! Run with: cargo bench

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use vitalwatch::derive::{derive_view, to_csv, SortSpec, ViewState};
use vitalwatch::model::{Alert, ConnectionStatus, Patient, Severity};
use vitalwatch::timefmt::DisplayZone;
use vitalwatch::views::{alerts, patients};

fn create_patients(count: usize) -> Vec<Patient> {
    let genders = ["Male", "Female", "Other"];
    (0..count)
        .map(|i| {
            let status = if i % 3 == 0 {
                ConnectionStatus::Offline
            } else {
                ConnectionStatus::Online
            };
            Patient::new(format!("P{:05}", count - i), format!("Patient {}", i))
                .age(20 + (i % 70) as u32)
                .gender(genders[i % genders.len()])
                .vitals(50 + (i % 90) as i64, 85 + (i % 15) as i64)
                .status(status)
        })
        .collect()
}

fn create_alerts(count: usize) -> Vec<Alert> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let severities = [Severity::High, Severity::Medium, Severity::Low];
    (0..count)
        .map(|i| {
            Alert::new(format!("A{}", i), format!("P{:05}", i % 500), "Patient")
                .severity(severities[i % severities.len()])
                .issue(if i % 2 == 0 { "Low oxygen" } else { "High heart rate" })
                .resolved(i % 4 == 0)
                .at(start + Duration::minutes(i as i64 * 37))
        })
        .collect()
}

fn bench_patients(c: &mut Criterion) {
    let mut group = c.benchmark_group("patients");
    let config = patients::view_config();

    for size in [100, 1000, 10000] {
        let records = create_patients(size);
        group.throughput(Throughput::Elements(size as u64));

        let default_state = config.initial_state();
        group.bench_function(format!("default_{}", size), |b| {
            b.iter(|| derive_view(Some(black_box(&records[..])), &default_state, &config))
        });

        let mut filtered = config
            .initial_state()
            .with_search("patient 1")
            .with_filter("status", "Online");
        filtered.sort = SortSpec::descending("name");
        group.bench_function(format!("search_filter_sort_{}", size), |b| {
            b.iter(|| derive_view(Some(black_box(&records[..])), &filtered, &config))
        });
    }

    group.finish();
}

fn bench_alerts(c: &mut Criterion) {
    let mut group = c.benchmark_group("alerts");
    let zone = DisplayZone::utc();
    let config = alerts::view_config(zone, zone.today());
    let records = create_alerts(5000);
    group.throughput(Throughput::Elements(records.len() as u64));

    let state = ViewState::new(alerts::newest()).with_page_size(50);
    group.bench_function("grouped_page_5000", |b| {
        b.iter(|| derive_view(Some(black_box(&records[..])), &state, &config))
    });

    let layout = alerts::csv_layout(zone);
    let view = derive_view(Some(&records[..]), &state, &config);
    group.bench_function("export_5000", |b| {
        b.iter(|| to_csv(black_box(view.filtered()), alerts::CSV_COLUMNS, &layout).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_patients, bench_alerts);
criterion_main!(benches);
