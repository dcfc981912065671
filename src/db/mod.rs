// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const BIKES: &str = "bikes";
    /// Item-type reference data, shared by all athletes
    pub const MAINTENANCE_TYPES: &str = "maintenance_types";
    pub const MAINTENANCE_RECORDS: &str = "bike_maintenance";
    pub const MAINTENANCE_SETTINGS: &str = "bike_maintenance_settings";
    pub const LIFESPAN_SETTINGS: &str = "bike_lifespan_settings";
    pub const ACTIVITIES: &str = "strava_activities";
    pub const WHEELSETS: &str = "wheelsets";
    /// Explicit activity → wheelset overrides (keyed by athlete_activity)
    pub const ACTIVITY_WHEELSETS: &str = "activity_wheelset";
    pub const APP_SETTINGS: &str = "app_settings";
}
