// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod activity;
pub mod app_setting;
pub mod bike;
pub mod maintenance;
pub mod reminder;
pub mod snapshot;
pub mod wheelset;

pub use activity::Activity;
pub use app_setting::AppSetting;
pub use bike::Bike;
pub use maintenance::{
    ItemTypeSet, LifespanSetting, MaintenanceItemType, MaintenanceRecord, MaintenanceSetting,
    PartDetail,
};
pub use reminder::{
    AxisUsage, IntervalSource, LastService, Reminder, ReminderLine, ServiceStatus,
    UnavailableReminder,
};
pub use snapshot::MaintenanceSnapshot;
pub use wheelset::{ActivityWheelsetAssignment, Wheelset};
