// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-athlete snapshot of every collection the engine reads.
//!
//! Loaded once per request with a handful of batched reads, then handed to
//! the pure services. Nothing is cached between requests, so overrides
//! written in between are always seen.

use super::app_setting::MAINTENANCE_ORDER_KEY;
use super::{
    Activity, ActivityWheelsetAssignment, AppSetting, Bike, LifespanSetting, MaintenanceItemType,
    MaintenanceRecord, MaintenanceSetting, Wheelset,
};

#[derive(Debug, Clone, Default)]
pub struct MaintenanceSnapshot {
    pub bikes: Vec<Bike>,
    pub item_types: Vec<MaintenanceItemType>,
    pub records: Vec<MaintenanceRecord>,
    pub settings: Vec<MaintenanceSetting>,
    pub lifespans: Vec<LifespanSetting>,
    pub activities: Vec<Activity>,
    pub wheelsets: Vec<Wheelset>,
    pub assignments: Vec<ActivityWheelsetAssignment>,
    pub app_settings: Vec<AppSetting>,
}

impl MaintenanceSnapshot {
    pub fn bike(&self, bike_id: &str) -> Option<&Bike> {
        self.bikes.iter().find(|b| b.id == bike_id)
    }

    /// Records for one bike, most recent service first.
    pub fn records_for_bike(&self, bike_id: &str) -> Vec<&MaintenanceRecord> {
        let mut records: Vec<&MaintenanceRecord> = self
            .records
            .iter()
            .filter(|r| r.bike_id == bike_id)
            .collect();
        records.sort_by(|a, b| {
            b.service_date
                .cmp(&a.service_date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        records
    }

    /// Persisted reminder display order (item-type ids), empty when unset.
    pub fn reminder_order(&self) -> Vec<String> {
        self.app_settings
            .iter()
            .filter(|s| s.key == MAINTENANCE_ORDER_KEY)
            .max_by_key(|s| s.updated_at)
            .map(AppSetting::as_id_list)
            .unwrap_or_default()
    }
}
