// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - maintenance engine.
//!
//! Everything here is pure: callers load a snapshot, pass it in and get
//! computed results back. Persistence lives in `crate::db`.

pub mod history;
pub mod labels;
pub mod reminders;
pub mod status;
pub mod thresholds;
pub mod wheelsets;

pub use history::{RideHistory, RideMetrics, ServiceHistoryEntry};
pub use labels::{plan_import, ImportPlan, ImportRow, LabelResolver, RejectedRow};
pub use reminders::{apply_display_order, build_reminders, summarize_alerts, AlertSummary};
pub use status::{classify, climbing_usage, distance_usage, time_usage};
pub use thresholds::{resolve_thresholds, ThresholdError, Thresholds};
pub use wheelsets::{
    apply_assignments, plan_assignments, AssignmentError, AssignmentFailure, AssignmentRequest,
    Attribution, WheelsetAttributor, MAX_BATCH_ASSIGNMENTS,
};
