// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Athlete-scoped maintenance API.
//!
//! Every handler validates its inputs before touching the store, then loads
//! one fresh snapshot and runs the engine over it.

use crate::error::{AppError, Result};
use crate::models::app_setting::MAINTENANCE_ORDER_KEY;
use crate::models::{
    AppSetting, Bike, LifespanSetting, MaintenanceSetting, MaintenanceSnapshot, ReminderLine,
};
use crate::services::{
    apply_assignments, apply_display_order, build_reminders, plan_assignments, plan_import,
    summarize_alerts, AlertSummary, AssignmentError, AssignmentRequest, Attribution, ImportRow,
    LabelResolver, RejectedRow, RideHistory, RideMetrics, ServiceHistoryEntry, WheelsetAttributor,
    MAX_BATCH_ASSIGNMENTS,
};
use crate::time_utils::parse_date_or_datetime;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Import requests larger than this are refused outright.
const MAX_IMPORT_ROWS: usize = 1000;

/// API routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/athletes/{athlete_id}/bikes/{bike_id}/reminders",
            get(get_reminders),
        )
        .route(
            "/api/athletes/{athlete_id}/bikes/{bike_id}/alerts",
            get(get_alerts),
        )
        .route(
            "/api/athletes/{athlete_id}/bikes/{bike_id}/metrics",
            get(get_metrics),
        )
        .route(
            "/api/athletes/{athlete_id}/bikes/{bike_id}/odometer",
            get(get_odometer),
        )
        .route(
            "/api/athletes/{athlete_id}/bikes/{bike_id}/records",
            get(get_records),
        )
        .route(
            "/api/athletes/{athlete_id}/bikes/{bike_id}/records/import",
            post(import_records),
        )
        .route(
            "/api/athletes/{athlete_id}/bikes/{bike_id}/settings/{type_id}",
            put(put_interval_setting),
        )
        .route(
            "/api/athletes/{athlete_id}/bikes/{bike_id}/lifespans/{type_id}",
            put(put_lifespan_setting),
        )
        .route(
            "/api/athletes/{athlete_id}/reminder-order",
            put(put_reminder_order),
        )
        .route("/api/athletes/{athlete_id}/wheelsets", get(get_wheelsets))
        .route(
            "/api/athletes/{athlete_id}/activity-wheelsets",
            put(put_activity_wheelsets),
        )
}

// ─── Helpers ─────────────────────────────────────────────────

async fn load_snapshot(state: &AppState, athlete_id: u64) -> Result<MaintenanceSnapshot> {
    let since = state
        .config
        .activity_lookback_days
        .map(|days| Utc::now() - Duration::days(i64::from(days)));
    state.db.load_snapshot(athlete_id, since).await
}

fn find_bike<'a>(snapshot: &'a MaintenanceSnapshot, bike_id: &str) -> Result<&'a Bike> {
    snapshot
        .bike(bike_id)
        .ok_or_else(|| AppError::NotFound(format!("Bike {} not found", bike_id)))
}

fn require_item_type(snapshot: &MaintenanceSnapshot, type_id: &str) -> Result<()> {
    if snapshot.item_types.iter().any(|t| t.id == type_id) {
        Ok(())
    } else {
        Err(AppError::NotFound(format!(
            "Maintenance type {} not found",
            type_id
        )))
    }
}

fn parse_instant(name: &str, raw: &str) -> Result<DateTime<Utc>> {
    parse_date_or_datetime(raw.trim()).ok_or_else(|| {
        AppError::BadRequest(format!(
            "{} must be YYYY-MM-DD or an RFC3339 timestamp",
            name
        ))
    })
}

fn ordered_reminders(snapshot: &MaintenanceSnapshot, bike: &Bike) -> Vec<ReminderLine> {
    apply_display_order(
        build_reminders(snapshot, bike, Utc::now()),
        &snapshot.reminder_order(),
    )
}

// ─── Reminders ───────────────────────────────────────────────

/// Reminder lines for one bike.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RemindersResponse {
    pub bike_id: String,
    pub current_km: f64,
    pub reminders: Vec<ReminderLine>,
}

async fn get_reminders(
    State(state): State<Arc<AppState>>,
    Path((athlete_id, bike_id)): Path<(u64, String)>,
) -> Result<Json<RemindersResponse>> {
    let snapshot = load_snapshot(&state, athlete_id).await?;
    let bike = find_bike(&snapshot, &bike_id)?;

    Ok(Json(RemindersResponse {
        bike_id: bike.id.clone(),
        current_km: bike.total_km(),
        reminders: ordered_reminders(&snapshot, bike),
    }))
}

async fn get_alerts(
    State(state): State<Arc<AppState>>,
    Path((athlete_id, bike_id)): Path<(u64, String)>,
) -> Result<Json<AlertSummary>> {
    let snapshot = load_snapshot(&state, athlete_id).await?;
    let bike = find_bike(&snapshot, &bike_id)?;
    let lines = build_reminders(&snapshot, bike, Utc::now());
    Ok(Json(summarize_alerts(&lines)))
}

// ─── Ride Metrics ────────────────────────────────────────────

/// Either `since`, or both `start` and `end`.
#[derive(Debug, Deserialize)]
pub struct MetricsQuery {
    pub since: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetricsWindow {
    Since(DateTime<Utc>),
    Between(DateTime<Utc>, DateTime<Utc>),
}

impl MetricsQuery {
    fn window(&self) -> Result<MetricsWindow> {
        match (&self.since, &self.start, &self.end) {
            (Some(since), None, None) => Ok(MetricsWindow::Since(parse_instant("since", since)?)),
            (None, Some(start), Some(end)) => {
                let start = parse_instant("start", start)?;
                let end = parse_instant("end", end)?;
                if start > end {
                    return Err(AppError::BadRequest(
                        "start must not be after end".to_string(),
                    ));
                }
                Ok(MetricsWindow::Between(start, end))
            }
            _ => Err(AppError::BadRequest(
                "Provide either since, or both start and end".to_string(),
            )),
        }
    }
}

#[derive(Serialize)]
pub struct MetricsResponse {
    pub bike_id: String,
    pub metrics: RideMetrics,
}

async fn get_metrics(
    State(state): State<Arc<AppState>>,
    Path((athlete_id, bike_id)): Path<(u64, String)>,
    Query(query): Query<MetricsQuery>,
) -> Result<Json<MetricsResponse>> {
    let window = query.window()?;
    let snapshot = load_snapshot(&state, athlete_id).await?;
    let bike = find_bike(&snapshot, &bike_id)?;
    let history = RideHistory::new(&snapshot.activities);

    let metrics = match window {
        MetricsWindow::Since(since) => history.metrics_since(&bike.id, since, Utc::now()),
        MetricsWindow::Between(start, end) => history.metrics_between(&bike.id, start, end),
    };

    Ok(Json(MetricsResponse {
        bike_id: bike.id.clone(),
        metrics,
    }))
}

#[derive(Debug, Deserialize)]
pub struct OdometerQuery {
    pub date: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct OdometerResponse {
    pub bike_id: String,
    pub at: String,
    pub total_km: f64,
}

async fn get_odometer(
    State(state): State<Arc<AppState>>,
    Path((athlete_id, bike_id)): Path<(u64, String)>,
    Query(query): Query<OdometerQuery>,
) -> Result<Json<OdometerResponse>> {
    let at = parse_instant("date", &query.date)?;
    let snapshot = load_snapshot(&state, athlete_id).await?;
    let bike = find_bike(&snapshot, &bike_id)?;

    Ok(Json(OdometerResponse {
        bike_id: bike.id.clone(),
        at: crate::time_utils::format_utc_rfc3339(at),
        total_km: RideHistory::new(&snapshot.activities).total_distance_at(bike, at),
    }))
}

// ─── Service Records ─────────────────────────────────────────

#[derive(Serialize)]
pub struct RecordView {
    /// Display label (type names plus any unresolved labels)
    pub label: String,
    #[serde(flatten)]
    pub entry: ServiceHistoryEntry,
}

#[derive(Serialize)]
pub struct RecordsResponse {
    pub bike_id: String,
    pub records: Vec<RecordView>,
}

async fn get_records(
    State(state): State<Arc<AppState>>,
    Path((athlete_id, bike_id)): Path<(u64, String)>,
) -> Result<Json<RecordsResponse>> {
    let snapshot = load_snapshot(&state, athlete_id).await?;
    let bike = find_bike(&snapshot, &bike_id)?;
    let resolver = LabelResolver::new(&snapshot.item_types);

    let records = RideHistory::new(&snapshot.activities)
        .service_history(bike, &snapshot.records_for_bike(&bike.id))
        .into_iter()
        .map(|entry| RecordView {
            label: resolver.format_record(&entry.record),
            entry,
        })
        .collect();

    Ok(Json(RecordsResponse {
        bike_id: bike.id.clone(),
        records,
    }))
}

#[derive(Serialize)]
pub struct ImportResponse {
    pub imported: usize,
    pub rejected: Vec<RejectedRow>,
    /// Imported records carrying labels that matched no maintenance type
    pub unresolved: usize,
}

async fn import_records(
    State(state): State<Arc<AppState>>,
    Path((athlete_id, bike_id)): Path<(u64, String)>,
    Json(rows): Json<Vec<ImportRow>>,
) -> Result<Json<ImportResponse>> {
    if rows.is_empty() {
        return Err(AppError::BadRequest("No rows to import".to_string()));
    }
    if rows.len() > MAX_IMPORT_ROWS {
        return Err(AppError::BadRequest(format!(
            "At most {} rows per import",
            MAX_IMPORT_ROWS
        )));
    }

    let snapshot = load_snapshot(&state, athlete_id).await?;
    let bike = find_bike(&snapshot, &bike_id)?;
    let resolver = LabelResolver::new(&snapshot.item_types);
    let plan = plan_import(athlete_id, &bike.id, rows, &resolver, Utc::now());

    if !plan.records.is_empty() {
        state.db.insert_maintenance_records(&plan.records).await?;
    }

    tracing::info!(
        athlete_id,
        bike_id = %bike.id,
        imported = plan.records.len(),
        rejected = plan.rejected.len(),
        "Maintenance records imported"
    );

    Ok(Json(ImportResponse {
        imported: plan.records.len(),
        unresolved: plan
            .records
            .iter()
            .filter(|r| !r.unresolved_labels.is_empty())
            .count(),
        rejected: plan.rejected,
    }))
}

// ─── Overrides ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct IntervalSettingRequest {
    pub custom_interval_km: f64,
}

async fn put_interval_setting(
    State(state): State<Arc<AppState>>,
    Path((athlete_id, bike_id, type_id)): Path<(u64, String, String)>,
    Json(request): Json<IntervalSettingRequest>,
) -> Result<Json<MaintenanceSetting>> {
    let km = request.custom_interval_km;
    if !km.is_finite() || km <= 0.0 {
        return Err(AppError::BadRequest(
            "custom_interval_km must be a positive number".to_string(),
        ));
    }

    let snapshot = load_snapshot(&state, athlete_id).await?;
    find_bike(&snapshot, &bike_id)?;
    require_item_type(&snapshot, &type_id)?;

    let setting = MaintenanceSetting {
        athlete_id,
        bike_id,
        maintenance_type_id: type_id,
        custom_interval_km: km,
        updated_at: Some(Utc::now()),
    };
    state.db.upsert_maintenance_setting(&setting).await?;

    tracing::info!(
        athlete_id,
        bike_id = %setting.bike_id,
        item_type_id = %setting.maintenance_type_id,
        interval_km = km,
        "Interval override saved"
    );

    Ok(Json(setting))
}

/// Either axis may be omitted to stop tracking it.
#[derive(Debug, Deserialize)]
pub struct LifespanSettingRequest {
    #[serde(default)]
    pub lifespan_km: Option<f64>,
    #[serde(default)]
    pub lifespan_days: Option<u32>,
}

async fn put_lifespan_setting(
    State(state): State<Arc<AppState>>,
    Path((athlete_id, bike_id, type_id)): Path<(u64, String, String)>,
    Json(request): Json<LifespanSettingRequest>,
) -> Result<Json<LifespanSetting>> {
    if request
        .lifespan_km
        .is_some_and(|km| !km.is_finite() || km <= 0.0)
    {
        return Err(AppError::BadRequest(
            "lifespan_km must be a positive number".to_string(),
        ));
    }
    if request.lifespan_days == Some(0) {
        return Err(AppError::BadRequest(
            "lifespan_days must be positive".to_string(),
        ));
    }

    let snapshot = load_snapshot(&state, athlete_id).await?;
    find_bike(&snapshot, &bike_id)?;
    require_item_type(&snapshot, &type_id)?;

    let setting = LifespanSetting {
        athlete_id,
        bike_id,
        maintenance_type_id: type_id,
        lifespan_km: request.lifespan_km,
        lifespan_days: request.lifespan_days,
        updated_at: Some(Utc::now()),
    };
    state.db.upsert_lifespan_setting(&setting).await?;

    tracing::info!(
        athlete_id,
        bike_id = %setting.bike_id,
        item_type_id = %setting.maintenance_type_id,
        "Lifespan override saved"
    );

    Ok(Json(setting))
}

#[derive(Debug, Deserialize)]
pub struct ReminderOrderRequest {
    pub order: Vec<String>,
}

#[derive(Serialize)]
pub struct ReminderOrderResponse {
    pub order: Vec<String>,
}

async fn put_reminder_order(
    State(state): State<Arc<AppState>>,
    Path(athlete_id): Path<u64>,
    Json(request): Json<ReminderOrderRequest>,
) -> Result<Json<ReminderOrderResponse>> {
    let mut order: Vec<String> = Vec::with_capacity(request.order.len());
    for id in request.order {
        let id = id.trim();
        if id.is_empty() {
            return Err(AppError::BadRequest(
                "order must not contain blank ids".to_string(),
            ));
        }
        if !order.iter().any(|existing| existing == id) {
            order.push(id.to_string());
        }
    }

    let setting = AppSetting {
        athlete_id,
        key: MAINTENANCE_ORDER_KEY.to_string(),
        value: serde_json::json!(order),
        updated_at: Utc::now(),
    };
    state.db.upsert_app_setting(&setting).await?;

    Ok(Json(ReminderOrderResponse { order }))
}

// ─── Wheelsets ───────────────────────────────────────────────

async fn get_wheelsets(
    State(state): State<Arc<AppState>>,
    Path(athlete_id): Path<u64>,
) -> Result<Json<Attribution>> {
    let snapshot = load_snapshot(&state, athlete_id).await?;
    let attribution = WheelsetAttributor::new(&snapshot.wheelsets, &snapshot.assignments)
        .attribute(&snapshot.activities);
    Ok(Json(attribution))
}

#[derive(Debug, Deserialize)]
pub struct AssignmentBatchRequest {
    pub assignments: Vec<AssignmentRequest>,
}

async fn put_activity_wheelsets(
    State(state): State<Arc<AppState>>,
    Path(athlete_id): Path<u64>,
    Json(request): Json<AssignmentBatchRequest>,
) -> Result<Json<Attribution>> {
    let len = request.assignments.len();
    if len == 0 {
        return Err(AssignmentError::Empty.into());
    }
    if len > MAX_BATCH_ASSIGNMENTS {
        return Err(AssignmentError::TooLarge {
            len,
            max: MAX_BATCH_ASSIGNMENTS,
        }
        .into());
    }

    let mut snapshot = load_snapshot(&state, athlete_id).await?;
    let planned = plan_assignments(
        athlete_id,
        &request.assignments,
        &snapshot.activities,
        &snapshot.wheelsets,
    )?;

    state
        .db
        .set_activity_wheelsets_atomic(athlete_id, &planned)
        .await?;

    apply_assignments(&mut snapshot.assignments, planned);
    let attribution = WheelsetAttributor::new(&snapshot.wheelsets, &snapshot.assignments)
        .attribute(&snapshot.activities);
    Ok(Json(attribution))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(since: Option<&str>, start: Option<&str>, end: Option<&str>) -> MetricsQuery {
        MetricsQuery {
            since: since.map(String::from),
            start: start.map(String::from),
            end: end.map(String::from),
        }
    }

    #[test]
    fn test_metrics_window_requires_one_shape() {
        assert!(matches!(
            query(Some("2024-01-01"), None, None).window(),
            Ok(MetricsWindow::Since(_))
        ));
        assert!(matches!(
            query(None, Some("2024-01-01"), Some("2024-02-01")).window(),
            Ok(MetricsWindow::Between(_, _))
        ));
        assert!(query(None, None, None).window().is_err());
        assert!(query(Some("2024-01-01"), Some("2024-01-01"), None)
            .window()
            .is_err());
        assert!(query(None, Some("2024-01-01"), None).window().is_err());
    }

    #[test]
    fn test_metrics_window_rejects_bad_input() {
        assert!(query(Some("yesterday"), None, None).window().is_err());
        assert!(query(None, Some("2024-03-01"), Some("2024-02-01"))
            .window()
            .is_err());
    }
}
