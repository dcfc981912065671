// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Historical ride metrics derived from the activity feed.
//!
//! Bikes only store their *current* odometer and records only store a
//! distance snapshot, so every window query and every past odometer reading
//! is derived from activities. Past readings are reconstructed by
//! subtracting later activities from the current total, which stays correct
//! when activities arrive or are edited out of order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Activity, Bike, MaintenanceRecord};
use crate::time_utils::{elapsed_whole_days, start_of_day};

/// Aggregate riding within a window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RideMetrics {
    pub distance_km: f64,
    pub moving_time_seconds: u64,
    pub moving_time_hours: f64,
    pub elevation_gain_m: f64,
    pub activity_count: usize,
    /// Whole days spanned by the window
    pub days: i64,
}

impl RideMetrics {
    fn from_activities<'a>(activities: impl Iterator<Item = &'a Activity>, days: i64) -> Self {
        let mut meters = 0.0;
        let mut metrics = Self {
            days,
            ..Self::default()
        };
        for activity in activities {
            meters += activity.distance;
            metrics.moving_time_seconds += activity.moving_time;
            metrics.elevation_gain_m += activity.total_elevation_gain;
            metrics.activity_count += 1;
        }
        metrics.distance_km = meters / 1000.0;
        metrics.moving_time_hours = metrics.moving_time_seconds as f64 / 3600.0;
        metrics
    }
}

/// Window queries over an athlete's activity snapshot.
#[derive(Debug, Clone, Copy)]
pub struct RideHistory<'a> {
    activities: &'a [Activity],
}

impl<'a> RideHistory<'a> {
    pub fn new(activities: &'a [Activity]) -> Self {
        Self { activities }
    }

    fn on_bike<'b>(&'b self, bike_id: &'b str) -> impl Iterator<Item = &'a Activity> + 'b {
        self.activities.iter().filter(move |a| a.is_on_bike(bike_id))
    }

    /// Riding on `bike_id` from `since` (inclusive) onwards; `days` runs to `now`.
    pub fn metrics_since(
        &self,
        bike_id: &str,
        since: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> RideMetrics {
        RideMetrics::from_activities(
            self.on_bike(bike_id).filter(|a| a.start_date >= since),
            elapsed_whole_days(since, now),
        )
    }

    /// Riding on `bike_id` in the window `(start, end]`.
    ///
    /// Matches "after the previous service, up to and including this one".
    pub fn metrics_between(
        &self,
        bike_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RideMetrics {
        RideMetrics::from_activities(
            self.on_bike(bike_id)
                .filter(|a| a.start_date > start && a.start_date <= end),
            elapsed_whole_days(start, end),
        )
    }

    /// Reconstruct the bike's odometer (km) as of `at`.
    ///
    /// Never negative: activities missing from the bike total (e.g. synced
    /// before the gear counter) would otherwise push the reading below zero.
    pub fn total_distance_at(&self, bike: &Bike, at: DateTime<Utc>) -> f64 {
        let later_meters: f64 = self
            .on_bike(&bike.id)
            .filter(|a| a.start_date > at)
            .map(|a| a.distance)
            .sum();
        (bike.total_km() - later_meters / 1000.0).max(0.0)
    }
}

/// One service in a bike's history with the riding that led up to it.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceHistoryEntry {
    pub record: MaintenanceRecord,
    /// Reconstructed odometer (km) at the start of the service day
    pub odometer_km: f64,
    /// Riding since the previous service; `None` for the first one
    pub since_previous: Option<RideMetrics>,
}

impl RideHistory<'_> {
    /// Build the service history for `bike`, oldest service first.
    pub fn service_history(
        &self,
        bike: &Bike,
        records: &[&MaintenanceRecord],
    ) -> Vec<ServiceHistoryEntry> {
        let mut ordered = records.to_vec();
        ordered.sort_by(|a, b| {
            a.service_date
                .cmp(&b.service_date)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });

        let mut previous: Option<DateTime<Utc>> = None;
        ordered
            .into_iter()
            .map(|record| {
                let at = start_of_day(record.service_date);
                let entry = ServiceHistoryEntry {
                    record: record.clone(),
                    odometer_km: self.total_distance_at(bike, at),
                    since_previous: previous.map(|start| self.metrics_between(&bike.id, start, at)),
                };
                previous = Some(at);
                entry
            })
            .collect()
    }
}
