// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reminder aggregation across all item types for one bike.
//!
//! Pure read/compute over a [`MaintenanceSnapshot`]. A bad item type only
//! costs its own line: it is reported as unavailable and the rest of the
//! list is still produced.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{
    Bike, LastService, MaintenanceItemType, MaintenanceRecord, MaintenanceSnapshot, Reminder,
    ReminderLine, ServiceStatus, UnavailableReminder,
};
use crate::services::history::RideHistory;
use crate::services::status::{climbing_usage, distance_usage, time_usage};
use crate::services::thresholds::resolve_thresholds;
use crate::time_utils::{elapsed_whole_days, start_of_day};

/// Build one reminder line per interval-bearing item type, in reference-data order.
pub fn build_reminders(
    snapshot: &MaintenanceSnapshot,
    bike: &Bike,
    now: DateTime<Utc>,
) -> Vec<ReminderLine> {
    let umbrella_ids: Vec<&str> = snapshot
        .item_types
        .iter()
        .filter(|t| t.informational)
        .map(|t| t.id.as_str())
        .collect();
    let bike_records = snapshot.records_for_bike(&bike.id);

    natural_order(&snapshot.item_types)
        .into_iter()
        .filter(|t| !t.informational)
        .map(|item_type| {
            let last = last_service_for(bike, item_type, &bike_records, &umbrella_ids);
            match build_reminder(snapshot, bike, item_type, last, now) {
                Ok(reminder) => ReminderLine::Available(reminder),
                Err(reason) => {
                    tracing::warn!(
                        bike_id = %bike.id,
                        item_type_id = %item_type.id,
                        error = %reason,
                        "Reminder unavailable for item type"
                    );
                    ReminderLine::Unavailable(UnavailableReminder {
                        item_type_id: item_type.id.clone(),
                        item_name: item_type.name.clone(),
                        reason: reason.to_string(),
                    })
                }
            }
        })
        .collect()
}

fn build_reminder(
    snapshot: &MaintenanceSnapshot,
    bike: &Bike,
    item_type: &MaintenanceItemType,
    last: Option<&MaintenanceRecord>,
    now: DateTime<Utc>,
) -> Result<Reminder, crate::services::thresholds::ThresholdError> {
    let thresholds = resolve_thresholds(
        &bike.id,
        item_type,
        &snapshot.settings,
        &snapshot.lifespans,
    )?;

    let current_km = bike.total_km();
    let last_km = last.map(|r| r.mileage_at_service);

    let distance = distance_usage(current_km, last_km, thresholds.interval_km);
    if distance.inverted_history {
        tracing::warn!(
            bike_id = %bike.id,
            item_type_id = %item_type.id,
            current_km,
            last_service_km = ?last_km,
            "Last service is ahead of the current odometer"
        );
    }

    let time = match (thresholds.lifespan_days, last) {
        (Some(days), Some(record)) => Some(time_usage(
            elapsed_whole_days(start_of_day(record.service_date), now),
            days,
        )),
        _ => None,
    };

    // Never serviced: every recorded climb counts, as the whole odometer does.
    let climbing = thresholds.climbing_m.map(|limit_m| {
        let since = last.map_or(DateTime::<Utc>::MIN_UTC, |r| start_of_day(r.service_date));
        let climbed = RideHistory::new(&snapshot.activities)
            .metrics_since(&bike.id, since, now)
            .elevation_gain_m;
        climbing_usage(climbed, limit_m)
    });

    Ok(Reminder {
        item_type_id: item_type.id.clone(),
        item_name: item_type.name.clone(),
        last_service: last.map(|r| LastService {
            record_id: r.id.clone(),
            service_date: r.service_date,
            mileage_at_service: r.mileage_at_service,
        }),
        current_km,
        interval_km: thresholds.interval_km,
        interval_source: thresholds.interval_source,
        next_service_km: last_km.unwrap_or(0.0) + thresholds.interval_km,
        distance,
        lifespan_distance: thresholds
            .lifespan_km
            .map(|km| distance_usage(current_km, last_km, km)),
        time,
        climbing,
    })
}

/// Item types sorted by `sort_order`, ties kept in collection order.
fn natural_order(item_types: &[MaintenanceItemType]) -> Vec<&MaintenanceItemType> {
    let mut ordered: Vec<&MaintenanceItemType> = item_types.iter().collect();
    ordered.sort_by_key(|t| t.sort_order);
    ordered
}

/// Most recent record (records must be newest-first) that serviced `item_type`.
///
/// A record matches when it lists the type itself or any umbrella type. For
/// wheelset-scoped types, records tied to a wheelset other than the bike's
/// active one are skipped.
fn last_service_for<'a>(
    bike: &Bike,
    item_type: &MaintenanceItemType,
    records_newest_first: &[&'a MaintenanceRecord],
    umbrella_ids: &[&str],
) -> Option<&'a MaintenanceRecord> {
    records_newest_first.iter().copied().find(|record| {
        let covers = record.item_types.contains(&item_type.id)
            || umbrella_ids.iter().any(|u| record.item_types.contains(u));
        if !covers {
            return false;
        }
        match (
            item_type.wheelset_scoped,
            bike.active_wheelset_id.as_deref(),
            record.wheelset_id.as_deref(),
        ) {
            (true, Some(active), Some(serviced)) => active == serviced,
            _ => true,
        }
    })
}

/// Reorder lines by a persisted list of item-type ids.
///
/// Ids in `order` come first (unknown or repeated ids are ignored); lines
/// not mentioned follow in their incoming order.
pub fn apply_display_order(lines: Vec<ReminderLine>, order: &[String]) -> Vec<ReminderLine> {
    let mut remaining: Vec<Option<ReminderLine>> = lines.into_iter().map(Some).collect();
    let mut ordered = Vec::with_capacity(remaining.len());

    for id in order {
        let slot = remaining
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|line| line.item_type_id() == id));
        if let Some(line) = slot.and_then(Option::take) {
            ordered.push(line);
        }
    }
    ordered.extend(remaining.into_iter().flatten());
    ordered
}

/// Due-soon / overdue counts for one axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AxisAlertCounts {
    pub due_soon: u32,
    pub overdue: u32,
}

impl AxisAlertCounts {
    fn count(&mut self, status: ServiceStatus) {
        match status {
            ServiceStatus::Ok => {}
            ServiceStatus::DueSoon => self.due_soon += 1,
            ServiceStatus::Overdue => self.overdue += 1,
        }
    }
}

/// Alert badge counts for a bike, kept per axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AlertSummary {
    pub distance: AxisAlertCounts,
    pub lifespan_distance: AxisAlertCounts,
    pub time: AxisAlertCounts,
    #[serde(default)]
    pub climbing: AxisAlertCounts,
    pub unavailable: u32,
}

pub fn summarize_alerts(lines: &[ReminderLine]) -> AlertSummary {
    let mut summary = AlertSummary::default();
    for line in lines {
        match line {
            ReminderLine::Available(r) => {
                summary.distance.count(r.distance.status);
                if let Some(axis) = r.lifespan_distance {
                    summary.lifespan_distance.count(axis.status);
                }
                if let Some(axis) = r.time {
                    summary.time.count(axis.status);
                }
                if let Some(axis) = r.climbing {
                    summary.climbing.count(axis.status);
                }
            }
            ReminderLine::Unavailable(_) => summary.unavailable += 1,
        }
    }
    summary
}
