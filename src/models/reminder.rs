// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Computed reminder shapes returned to the UI.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Three-state service status, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    Ok,
    DueSoon,
    Overdue,
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::DueSoon => write!(f, "due_soon"),
            Self::Overdue => write!(f, "overdue"),
        }
    }
}

/// Where the effective interval came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "snake_case")]
pub enum IntervalSource {
    TypeDefault,
    TypeEstimate,
    BikeOverride,
}

/// Progress along one axis (distance in km, climbing in m, or time in days).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AxisUsage {
    /// Amount consumed since the last service
    pub used: f64,
    /// Limit the usage is measured against
    pub limit: f64,
    pub percentage: f64,
    pub status: ServiceStatus,
    /// Last service sits ahead of the current reading (negative usage)
    #[serde(default)]
    pub inverted_history: bool,
}

/// Reference to the record a reminder is measured from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LastService {
    pub record_id: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub service_date: NaiveDate,
    pub mileage_at_service: f64,
}

/// Reminder for one item type on one bike.
///
/// The axes are independent; none of them is folded into another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Reminder {
    pub item_type_id: String,
    pub item_name: String,
    pub last_service: Option<LastService>,
    pub current_km: f64,
    pub interval_km: f64,
    pub interval_source: IntervalSource,
    pub next_service_km: f64,
    /// Service-interval axis
    pub distance: AxisUsage,
    /// Lifespan-in-distance axis, when configured
    pub lifespan_distance: Option<AxisUsage>,
    /// Lifespan-in-days axis, when configured and a service date exists
    pub time: Option<AxisUsage>,
    /// Climbing axis (elevation gain since the last service), when configured
    #[serde(default)]
    pub climbing: Option<AxisUsage>,
}

/// Placeholder for an item type whose reminder could not be computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UnavailableReminder {
    pub item_type_id: String,
    pub item_name: String,
    pub reason: String,
}

/// One rendered line of the reminder list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ReminderLine {
    Available(Reminder),
    Unavailable(UnavailableReminder),
}

impl ReminderLine {
    pub fn item_type_id(&self) -> &str {
        match self {
            Self::Available(r) => &r.item_type_id,
            Self::Unavailable(u) => &u.item_type_id,
        }
    }

    pub fn reminder(&self) -> Option<&Reminder> {
        match self {
            Self::Available(r) => Some(r),
            Self::Unavailable(_) => None,
        }
    }
}
