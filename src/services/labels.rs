// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Human-readable item-type labels and validated import rows.
//!
//! Exports write item-type *names*; imports may carry either names or ids.
//! A label that matches no known type is never guessed at. It is kept on
//! the record verbatim so it can be reconciled by hand.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::{ItemTypeSet, MaintenanceItemType, MaintenanceRecord};

/// Maps labels (ids or names) back to item-type ids.
pub struct LabelResolver<'a> {
    by_id: HashMap<&'a str, &'a MaintenanceItemType>,
    by_name: HashMap<String, &'a str>,
}

/// Outcome of resolving one label field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedLabels {
    pub types: ItemTypeSet,
    pub unresolved: Vec<String>,
}

impl<'a> LabelResolver<'a> {
    pub fn new(item_types: &'a [MaintenanceItemType]) -> Self {
        Self {
            by_id: item_types.iter().map(|t| (t.id.as_str(), t)).collect(),
            by_name: item_types
                .iter()
                .map(|t| (normalize(&t.name), t.id.as_str()))
                .collect(),
        }
    }

    fn lookup(&self, label: &str) -> Option<&'a str> {
        let label = label.trim();
        self.by_id
            .get(label)
            .map(|t| t.id.as_str())
            .or_else(|| self.by_name.get(&normalize(label)).copied())
    }

    /// Resolve a label field that may list several types.
    ///
    /// Segments are matched greedily: at each position the longest run of
    /// comma-separated segments that names a known type wins, so a type
    /// name containing a comma resolves as one type even next to others.
    pub fn resolve(&self, field: &str) -> ResolvedLabels {
        let mut resolved = ResolvedLabels::default();
        let segments: Vec<&str> = field
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        let mut start = 0;
        while start < segments.len() {
            let matched = (start + 1..=segments.len()).rev().find_map(|end| {
                self.lookup(&segments[start..end].join(ItemTypeSet::JOIN_SEPARATOR))
                    .map(|id| (id, end))
            });
            match matched {
                Some((id, end)) => {
                    resolved.types.insert(id);
                    start = end;
                }
                None => {
                    let part = segments[start];
                    if !resolved.unresolved.iter().any(|u| u == part) {
                        resolved.unresolved.push(part.to_string());
                    }
                    start += 1;
                }
            }
        }
        resolved
    }

    /// Export label for a record: type names, then any unresolved labels.
    pub fn format_record(&self, record: &MaintenanceRecord) -> String {
        record
            .item_types
            .iter()
            .map(|id| self.by_id.get(id).map_or(id, |t| t.name.as_str()))
            .chain(record.unresolved_labels.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(ItemTypeSet::JOIN_SEPARATOR)
    }
}

/// Case-folded with the spacing around commas made uniform.
fn normalize(label: &str) -> String {
    label
        .split(',')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(ItemTypeSet::JOIN_SEPARATOR)
        .to_lowercase()
}

/// One import row, already split into fields.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ImportRow {
    #[validate(custom(function = validate_service_date))]
    pub service_date: String,
    #[validate(length(min = 1, message = "maintenance type is required"))]
    pub maintenance_type: String,
    #[validate(range(min = 0.0, message = "distance must not be negative"))]
    pub mileage_at_service: f64,
    #[validate(range(min = 0.0, message = "cost must not be negative"))]
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub shop_name: Option<String>,
    #[serde(default)]
    pub is_diy: bool,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub other: Option<String>,
}

fn validate_service_date(value: &str) -> Result<(), ValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| {
            let mut err = ValidationError::new("service_date");
            err.message = Some("expected YYYY-MM-DD".into());
            err
        })
}

/// A row that failed validation, reported back by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedRow {
    /// Zero-based index in the submitted list
    pub row: usize,
    pub errors: String,
}

/// Records ready to insert plus the rows that were skipped.
#[derive(Debug, Clone, Default)]
pub struct ImportPlan {
    pub records: Vec<MaintenanceRecord>,
    pub rejected: Vec<RejectedRow>,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Validate import rows and build records for the valid ones.
pub fn plan_import(
    athlete_id: u64,
    bike_id: &str,
    rows: Vec<ImportRow>,
    resolver: &LabelResolver<'_>,
    now: DateTime<Utc>,
) -> ImportPlan {
    let mut plan = ImportPlan::default();

    for (row, import) in rows.into_iter().enumerate() {
        if let Err(errors) = import.validate() {
            plan.rejected.push(RejectedRow {
                row,
                errors: errors.to_string(),
            });
            continue;
        }
        let Ok(service_date) = NaiveDate::parse_from_str(import.service_date.trim(), "%Y-%m-%d")
        else {
            continue;
        };

        let labels = resolver.resolve(&import.maintenance_type);
        if labels.types.is_empty() && labels.unresolved.is_empty() {
            plan.rejected.push(RejectedRow {
                row,
                errors: "maintenance_type: no maintenance type labels".to_string(),
            });
            continue;
        }
        if !labels.unresolved.is_empty() {
            tracing::warn!(
                athlete_id,
                bike_id,
                row,
                unresolved = ?labels.unresolved,
                "Import row carries unknown maintenance types"
            );
        }

        plan.records.push(MaintenanceRecord {
            id: format!("{}_{}_{}", bike_id, now.timestamp_millis(), row),
            athlete_id,
            bike_id: bike_id.to_string(),
            item_types: labels.types,
            service_date,
            mileage_at_service: import.mileage_at_service,
            cost: import.cost,
            shop_name: blank_to_none(import.shop_name),
            notes: blank_to_none(import.notes),
            is_diy: import.is_diy,
            other: blank_to_none(import.other),
            wheelset_id: None,
            parts_details: Vec::new(),
            unresolved_labels: labels.unresolved,
            created_at: now,
        });
    }
    plan
}
