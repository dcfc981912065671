// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava activity model, as read from the synced activity feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Synced activity record. Append-only and read-only to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    /// Strava activity ID (also used as document ID)
    pub id: u64,
    /// Strava athlete ID (owner)
    pub athlete_id: u64,
    #[serde(default)]
    pub name: String,
    /// Distance in meters
    pub distance: f64,
    /// Moving time in seconds
    #[serde(default)]
    pub moving_time: u64,
    /// Total elevation gain in meters
    #[serde(default)]
    pub total_elevation_gain: f64,
    /// Activity start (UTC)
    pub start_date: DateTime<Utc>,
    /// Bike the activity was recorded on (Strava gear ID)
    #[serde(default)]
    pub gear_id: Option<String>,
}

impl Activity {
    /// Whether this activity was ridden on the given bike.
    pub fn is_on_bike(&self, bike_id: &str) -> bool {
        self.gear_id.as_deref() == Some(bike_id)
    }
}
