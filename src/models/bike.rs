// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bike (Strava gear) model.

use serde::{Deserialize, Serialize};

/// Bike record as synced from Strava gear.
///
/// Distance is mutated by the activity sync; `active_wheelset_id` by
/// maintenance settings updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bike {
    /// Strava gear ID (e.g. "b1234567", also used as document ID)
    pub id: String,
    /// Strava athlete ID (owner)
    pub athlete_id: u64,
    /// Display name
    pub name: String,
    /// Cumulative distance in meters
    #[serde(default)]
    pub distance: f64,
    /// Cumulative distance in kilometers, pre-converted by the sync
    #[serde(default)]
    pub converted_distance: Option<f64>,
    /// Wheelset currently mounted on this bike
    #[serde(default)]
    pub active_wheelset_id: Option<String>,
    #[serde(default)]
    pub retired: bool,
}

impl Bike {
    /// Current odometer in kilometers.
    ///
    /// The pre-converted kilometer field wins whenever the sync wrote it.
    pub fn total_km(&self) -> f64 {
        self.converted_distance
            .unwrap_or(self.distance / 1000.0)
    }
}
