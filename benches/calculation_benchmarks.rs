//! Performance benchmarks for the Attendance Engine.
//!
//! Covers the hot paths of the pipeline:
//! - Device record decoding
//! - Daily window reconstruction over a month of punches
//! - Payroll aggregation over 100 and 1000 employees
//! - Punch ingestion through the HTTP router
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use std::sync::Arc;

use chrono::{Days, NaiveDate, NaiveTime};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;

use attendance_engine::api::{AppState, create_router};
use attendance_engine::calculation::{
    aggregate_payroll, decode_device_record, reconstruct_daily_window,
};
use attendance_engine::config::{EngineConfig, PayrollPolicy};
use attendance_engine::models::{
    AttendanceStatus, PunchDirection, PunchRecord, RawAttendanceRecord,
};
use attendance_engine::repository::MemoryStore;
use attendance_engine::service::AttendanceEngine;

use axum::{body::Body, http::Request};
use tower::ServiceExt;

const TERMINAL_SAMPLE: &str =
    "2F00323030000000000000000000000000000000000000000000011EBAFE2F050000000000000000";

fn first_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
}

/// Four punches a day (in, lunch out, lunch in, out) for `days` days.
fn month_of_punches(days: u64) -> Vec<PunchRecord> {
    let times = [
        (8, 0, PunchDirection::In),
        (12, 30, PunchDirection::Out),
        (13, 0, PunchDirection::In),
        (17, 0, PunchDirection::Out),
    ];

    (0..days)
        .flat_map(|offset| {
            let date = first_day() + Days::new(offset);
            times.iter().map(move |(h, m, direction)| (date, *h, *m, *direction))
        })
        .enumerate()
        .map(|(i, (date, h, m, direction))| PunchRecord {
            id: i as u64 + 1,
            badge_id: 2001,
            timestamp: date.and_time(NaiveTime::from_hms_opt(h, m, 0).unwrap()),
            direction: Some(direction),
            serial_number: "SN".to_string(),
            uid: 1,
            status: 1,
            punch_hint: 0,
        })
        .collect()
}

/// Twenty records per employee.
fn payroll_records(employees: u64) -> Vec<RawAttendanceRecord> {
    (0..employees)
        .flat_map(|employee| {
            (0..20u64).map(move |day| RawAttendanceRecord {
                id: employee * 20 + day + 1,
                work_day_id: day + 1,
                company_id: 1,
                employee_id: employee + 1,
                employee_name: format!("Employee {}", employee + 1),
                position: None,
                start_at: NaiveTime::from_hms_opt(8, 0, 0),
                end_at: NaiveTime::from_hms_opt(18, 0, 0),
                total_hours: Some(Decimal::from(10)),
                total_hours_out: Some(Decimal::new(5, 1)),
                status: AttendanceStatus::Present,
                notes: String::new(),
                calculate_overtime: day % 5 == 0,
                calculate_lunch_hour: true,
            })
        })
        .collect()
}

fn bench_decode(c: &mut Criterion) {
    c.bench_function("decode_device_record", |b| {
        b.iter(|| decode_device_record(black_box("CQZ7232260044"), black_box(TERMINAL_SAMPLE)))
    });
}

fn bench_daily_window(c: &mut Criterion) {
    let punches = month_of_punches(31);

    c.bench_function("reconstruct_daily_window/31_days", |b| {
        b.iter(|| {
            (0..31u64)
                .filter_map(|offset| {
                    reconstruct_daily_window(
                        2001,
                        first_day() + Days::new(offset),
                        black_box(&punches),
                    )
                })
                .count()
        })
    });
}

fn bench_payroll(c: &mut Criterion) {
    let policy = PayrollPolicy::default();
    let mut group = c.benchmark_group("aggregate_payroll");

    for employees in [100u64, 1000] {
        let records = payroll_records(employees);
        group.throughput(Throughput::Elements(records.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(employees),
            &records,
            |b, records| b.iter(|| aggregate_payroll(black_box(records), &policy)),
        );
    }

    group.finish();
}

fn bench_http_ingest(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let engine = AttendanceEngine::new(Arc::new(MemoryStore::new()), EngineConfig::default());
    let router = create_router(AppState::new(engine));
    let body = serde_json::json!({ "serial_number": "CQZ7232260044", "hex_data": TERMINAL_SAMPLE })
        .to_string();

    c.bench_function("http/attendance_logs", |b| {
        b.to_async(&runtime).iter(|| {
            let router = router.clone();
            let body = body.clone();
            async move {
                router
                    .oneshot(
                        Request::builder()
                            .method("POST")
                            .uri("/attendance-logs")
                            .header("Content-Type", "application/json")
                            .body(Body::from(body))
                            .unwrap(),
                    )
                    .await
                    .unwrap()
            }
        })
    });
}

criterion_group!(
    benches,
    bench_decode,
    bench_daily_window,
    bench_payroll,
    bench_http_ingest
);
criterion_main!(benches);
