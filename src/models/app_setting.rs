// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-athlete UI preferences stored as key/value documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Key under which the reminder display order is stored.
pub const MAINTENANCE_ORDER_KEY: &str = "maintenance_order";

/// Stored at: `app_settings/{athlete_id}_{key}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSetting {
    pub athlete_id: u64,
    pub key: String,
    pub value: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

impl AppSetting {
    pub fn document_id(athlete_id: u64, key: &str) -> String {
        format!("{}_{}", athlete_id, key)
    }

    /// Read the value as a list of item-type ids. Non-string entries are dropped.
    pub fn as_id_list(&self) -> Vec<String> {
        self.value
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }
}
