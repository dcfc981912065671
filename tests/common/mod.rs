// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::{DateTime, NaiveDate, Utc};
use maintenance_tracker::config::Config;
use maintenance_tracker::db::FirestoreDb;
use maintenance_tracker::models::{
    Activity, Bike, ItemTypeSet, MaintenanceItemType, MaintenanceRecord, Wheelset,
};
use maintenance_tracker::routes::create_router;
use maintenance_tracker::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a test app with an offline mock database.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState {
        config: Config::default(),
        db: FirestoreDb::new_mock(),
    });

    (create_router(state.clone()), state)
}

/// Generate a unique athlete ID for test isolation.
#[allow(dead_code)]
pub fn unique_athlete_id() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos() as u64
}

#[allow(dead_code)]
pub fn parse_time(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .unwrap()
        .with_timezone(&Utc)
}

#[allow(dead_code)]
pub fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
}

#[allow(dead_code)]
pub fn bike(id: &str, km: f64) -> Bike {
    Bike {
        id: id.to_string(),
        athlete_id: 1,
        name: format!("Bike {}", id),
        distance: km * 1000.0,
        converted_distance: Some(km),
        active_wheelset_id: None,
        retired: false,
    }
}

#[allow(dead_code)]
pub fn item_type(id: &str, default_km: f64, sort_order: i32) -> MaintenanceItemType {
    MaintenanceItemType {
        id: id.to_string(),
        name: id.replace('_', " "),
        description: None,
        default_interval_km: Some(default_km),
        sort_order,
        informational: false,
        wheelset_scoped: false,
        estimated_lifespan_km: None,
        climbing_lifespan_m: None,
    }
}

#[allow(dead_code)]
pub fn record(id: &str, bike_id: &str, types: &str, service_date: &str, km: f64) -> MaintenanceRecord {
    MaintenanceRecord {
        id: id.to_string(),
        athlete_id: 1,
        bike_id: bike_id.to_string(),
        item_types: ItemTypeSet::split_joined(types),
        service_date: date(service_date),
        mileage_at_service: km,
        cost: None,
        shop_name: None,
        notes: None,
        is_diy: false,
        other: None,
        wheelset_id: None,
        parts_details: Vec::new(),
        unresolved_labels: Vec::new(),
        created_at: parse_time(&format!("{}T12:00:00Z", service_date)),
    }
}

#[allow(dead_code)]
pub fn activity(id: u64, bike_id: &str, start: &str, meters: f64) -> Activity {
    Activity {
        id,
        athlete_id: 1,
        name: format!("Ride {}", id),
        distance: meters,
        moving_time: (meters / 7.0) as u64,
        total_elevation_gain: meters / 100.0,
        start_date: parse_time(start),
        gear_id: Some(bike_id.to_string()),
    }
}

#[allow(dead_code)]
pub fn wheelset(id: &str, bike_id: Option<&str>, active_date: Option<&str>) -> Wheelset {
    Wheelset {
        id: id.to_string(),
        athlete_id: 1,
        bike_id: bike_id.map(String::from),
        name: format!("Wheels {}", id),
        distance: 0.0,
        active_date: active_date.map(date),
        updated_at: None,
    }
}
