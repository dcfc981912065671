// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Snapshot reads (everything the engine needs for one athlete)
//! - Per-bike interval and lifespan overrides
//! - Maintenance records (import)
//! - Activity-wheelset assignments (atomic batches)
//! - App settings (reminder order)

use chrono::{DateTime, Utc};
use futures_util::{stream, StreamExt};
use serde::de::DeserializeOwned;

use crate::db::collections;
use crate::error::AppError;
use crate::models::{
    ActivityWheelsetAssignment, AppSetting, LifespanSetting, MaintenanceRecord,
    MaintenanceSetting, MaintenanceSnapshot,
};
use crate::services::MAX_BATCH_ASSIGNMENTS;
use crate::time_utils::format_utc_rfc3339;

const MAX_CONCURRENT_DB_OPS: usize = 50;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Snapshot Reads ──────────────────────────────────────────

    /// All documents of `collection` owned by `athlete_id`.
    async fn list_for_athlete<T>(&self, collection: &str, athlete_id: u64) -> Result<Vec<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        self.get_client()?
            .fluent()
            .select()
            .from(collection)
            .filter(|q| q.for_all([q.field("athlete_id").eq(athlete_id)]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(format!("Failed to read {}: {}", collection, e)))
    }

    /// Item-type reference data (not athlete-scoped).
    async fn list_item_types<T>(&self) -> Result<Vec<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::MAINTENANCE_TYPES)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(format!("Failed to read item types: {}", e)))
    }

    /// Activities for an athlete, optionally only those starting at or after `since`.
    async fn list_activities<T>(
        &self,
        athlete_id: u64,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        let since = since.map(format_utc_rfc3339);
        self.get_client()?
            .fluent()
            .select()
            .from(collections::ACTIVITIES)
            .filter(move |q| {
                q.for_all([
                    q.field("athlete_id").eq(athlete_id),
                    since
                        .clone()
                        .and_then(|s| q.field("start_date").greater_than_or_equal(s)),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(format!("Failed to read activities: {}", e)))
    }

    /// Load every collection the engine reads for one athlete.
    ///
    /// One query per collection, issued concurrently. `activities_since`
    /// limits the activity read; `None` reads the full history, which
    /// odometer reconstruction needs to be exact.
    pub async fn load_snapshot(
        &self,
        athlete_id: u64,
        activities_since: Option<DateTime<Utc>>,
    ) -> Result<MaintenanceSnapshot, AppError> {
        let (
            bikes,
            item_types,
            records,
            settings,
            lifespans,
            activities,
            wheelsets,
            assignments,
            app_settings,
        ) = tokio::try_join!(
            self.list_for_athlete(collections::BIKES, athlete_id),
            self.list_item_types(),
            self.list_for_athlete(collections::MAINTENANCE_RECORDS, athlete_id),
            self.list_for_athlete(collections::MAINTENANCE_SETTINGS, athlete_id),
            self.list_for_athlete(collections::LIFESPAN_SETTINGS, athlete_id),
            self.list_activities(athlete_id, activities_since),
            self.list_for_athlete(collections::WHEELSETS, athlete_id),
            self.list_for_athlete(collections::ACTIVITY_WHEELSETS, athlete_id),
            self.list_for_athlete(collections::APP_SETTINGS, athlete_id),
        )?;

        let snapshot = MaintenanceSnapshot {
            bikes,
            item_types,
            records,
            settings,
            lifespans,
            activities,
            wheelsets,
            assignments,
            app_settings,
        };

        tracing::debug!(
            athlete_id,
            bikes = snapshot.bikes.len(),
            records = snapshot.records.len(),
            activities = snapshot.activities.len(),
            wheelsets = snapshot.wheelsets.len(),
            "Loaded maintenance snapshot"
        );

        Ok(snapshot)
    }

    // ─── Override Settings ───────────────────────────────────────

    /// Create or replace the interval override for a (bike, item type) pair.
    pub async fn upsert_maintenance_setting(
        &self,
        setting: &MaintenanceSetting,
    ) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::MAINTENANCE_SETTINGS)
            .document_id(MaintenanceSetting::document_id(
                &setting.bike_id,
                &setting.maintenance_type_id,
            ))
            .object(setting)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Create or replace the lifespan override for a (bike, item type) pair.
    pub async fn upsert_lifespan_setting(&self, setting: &LifespanSetting) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::LIFESPAN_SETTINGS)
            .document_id(LifespanSetting::document_id(
                &setting.bike_id,
                &setting.maintenance_type_id,
            ))
            .object(setting)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Create or replace a per-athlete app setting.
    pub async fn upsert_app_setting(&self, setting: &AppSetting) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::APP_SETTINGS)
            .document_id(AppSetting::document_id(setting.athlete_id, &setting.key))
            .object(setting)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Maintenance Records ─────────────────────────────────────

    /// Store imported maintenance records.
    ///
    /// Uses concurrent writes with a limit to avoid overloading Firestore.
    pub async fn insert_maintenance_records(
        &self,
        records: &[MaintenanceRecord],
    ) -> Result<(), AppError> {
        let client = self.get_client()?;

        stream::iter(records.to_vec())
            .map(|record| async move {
                let _: () = client
                    .fluent()
                    .update()
                    .in_col(collections::MAINTENANCE_RECORDS)
                    .document_id(&record.id)
                    .object(&record)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;

                Ok::<_, AppError>(())
            })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<(), AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<()>, AppError>>()?;

        tracing::info!(count = records.len(), "Inserted maintenance records");
        Ok(())
    }

    // ─── Activity-Wheelset Assignments ───────────────────────────

    /// Write a batch of activity → wheelset assignments in one transaction.
    ///
    /// Either every assignment is stored or none is. Batches larger than a
    /// single transaction can hold are refused before anything is written.
    pub async fn set_activity_wheelsets_atomic(
        &self,
        athlete_id: u64,
        assignments: &[ActivityWheelsetAssignment],
    ) -> Result<(), AppError> {
        if assignments.len() > MAX_BATCH_ASSIGNMENTS {
            return Err(AppError::BadRequest(format!(
                "At most {} assignments per batch",
                MAX_BATCH_ASSIGNMENTS
            )));
        }

        let client = self.get_client()?;
        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        for assignment in assignments {
            client
                .fluent()
                .update()
                .in_col(collections::ACTIVITY_WHEELSETS)
                .document_id(assignment.document_id())
                .object(assignment)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!(
                        "Failed to add assignment to transaction: {}",
                        e
                    ))
                })?;
        }

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(
            athlete_id,
            count = assignments.len(),
            "Activity wheelsets assigned atomically"
        );

        Ok(())
    }
}
