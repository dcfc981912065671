use chrono::{Duration, NaiveDate, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};
use maintenance_tracker::models::{Activity, ActivityWheelsetAssignment, Wheelset};
use maintenance_tracker::services::{RideHistory, WheelsetAttributor};
use std::hint::black_box;

/// A few years of riding across three bikes, with a wheelset swap every few months.
fn fixture() -> (Vec<Activity>, Vec<Wheelset>, Vec<ActivityWheelsetAssignment>) {
    let start = Utc.with_ymd_and_hms(2021, 1, 1, 7, 0, 0).unwrap();
    let bikes = ["road", "gravel", "commuter"];

    let activities = (0..5000u64)
        .map(|i| Activity {
            id: i,
            athlete_id: 1,
            name: String::new(),
            distance: 15_000.0 + (i % 40) as f64 * 1000.0,
            moving_time: 3600,
            total_elevation_gain: 250.0,
            start_date: start + Duration::hours(i as i64 * 7),
            gear_id: Some(bikes[(i % 3) as usize].to_string()),
        })
        .collect();

    let wheelsets = (0..36u32)
        .map(|i| Wheelset {
            id: format!("w{}", i),
            athlete_id: 1,
            bike_id: Some(bikes[(i % 3) as usize].to_string()),
            name: format!("Wheelset {}", i),
            distance: 0.0,
            active_date: NaiveDate::from_ymd_opt(2021, 1, 1)
                .map(|d| d + Duration::days(i64::from(i / 3) * 120)),
            updated_at: None,
        })
        .collect();

    let assignments = (0..5000u64)
        .step_by(25)
        .map(|activity_id| ActivityWheelsetAssignment {
            athlete_id: 1,
            activity_id,
            wheelset_id: "w0".to_string(),
        })
        .collect();

    (activities, wheelsets, assignments)
}

fn benchmark_attribution(c: &mut Criterion) {
    let (activities, wheelsets, assignments) = fixture();

    let mut group = c.benchmark_group("wheelsets");
    group.bench_function("attribute_5000_activities", |b| {
        b.iter(|| {
            WheelsetAttributor::new(black_box(&wheelsets), black_box(&assignments))
                .attribute(black_box(&activities))
        })
    });
    group.finish();

    let history = RideHistory::new(&activities);
    let bike = maintenance_tracker::models::Bike {
        id: "road".to_string(),
        athlete_id: 1,
        name: "Road".to_string(),
        distance: 40_000_000.0,
        converted_distance: None,
        active_wheelset_id: None,
        retired: false,
    };
    let at = Utc.with_ymd_and_hms(2022, 6, 1, 0, 0, 0).unwrap();

    let mut group = c.benchmark_group("history");
    group.bench_function("total_distance_at", |b| {
        b.iter(|| history.total_distance_at(black_box(&bike), black_box(at)))
    });
    group.finish();
}

criterion_group!(benches, benchmark_attribution);
criterion_main!(benches);
