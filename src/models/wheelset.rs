// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Wheelset model and explicit activity-to-wheelset assignments.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A removable wheelset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wheelset {
    pub id: String,
    pub athlete_id: u64,
    /// Owning bike; `None` means the general pool (usable by any bike)
    #[serde(default)]
    pub bike_id: Option<String>,
    pub name: String,
    /// Distance ridden before entering the system, in meters
    #[serde(default)]
    pub distance: f64,
    /// Date the wheelset went into service on its bike
    #[serde(default)]
    pub active_date: Option<NaiveDate>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Wheelset {
    /// Whether activities ridden on `bike_id` may be attributed to this wheelset.
    pub fn is_usable_by(&self, bike_id: &str) -> bool {
        match &self.bike_id {
            Some(owner) => owner == bike_id,
            None => true,
        }
    }
}

/// Explicit activity → wheelset mapping. Takes precedence over inference.
///
/// Stored at: `activity_wheelset/{athlete_id}_{activity_id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityWheelsetAssignment {
    pub athlete_id: u64,
    pub activity_id: u64,
    pub wheelset_id: String,
}

impl ActivityWheelsetAssignment {
    pub fn document_id(&self) -> String {
        format!("{}_{}", self.athlete_id, self.activity_id)
    }
}
