// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Maintenance reference data, per-bike overrides and service records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A category of maintenance work (reference data, read-only).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceItemType {
    /// Stable identifier (e.g. "chain_lube")
    pub id: String,
    /// Human-readable label, also used for import/export
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Default service interval in kilometers
    #[serde(default)]
    pub default_interval_km: Option<f64>,
    /// Expected component life in kilometers; used as the interval in
    /// place of the default when set
    #[serde(default)]
    pub estimated_lifespan_km: Option<f64>,
    /// Lifespan in meters of climbing, `None` when untracked
    #[serde(default)]
    pub climbing_lifespan_m: Option<f64>,
    /// Natural display order
    #[serde(default)]
    pub sort_order: i32,
    /// Umbrella type with no interval of its own (e.g. "full_service").
    /// A record carrying it counts as a service of every type.
    #[serde(default)]
    pub informational: bool,
    /// Component lives on the wheelset (e.g. tires): records tied to
    /// another wheelset do not count for the bike's active wheelset.
    #[serde(default)]
    pub wheelset_scoped: bool,
}

/// Per-bike custom service interval.
///
/// Stored at: `bike_maintenance_settings/{bike_id}_{maintenance_type_id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceSetting {
    pub athlete_id: u64,
    pub bike_id: String,
    pub maintenance_type_id: String,
    /// Custom interval in kilometers
    pub custom_interval_km: f64,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl MaintenanceSetting {
    pub fn document_id(bike_id: &str, type_id: &str) -> String {
        format!("{}_{}", bike_id, type_id)
    }
}

/// Per-bike lifespan limits. Either axis may be absent (untracked).
///
/// Stored at: `bike_lifespan_settings/{bike_id}_{maintenance_type_id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifespanSetting {
    pub athlete_id: u64,
    pub bike_id: String,
    pub maintenance_type_id: String,
    /// Lifespan in kilometers
    #[serde(default)]
    pub lifespan_km: Option<f64>,
    /// Lifespan in days
    #[serde(default)]
    pub lifespan_days: Option<u32>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl LifespanSetting {
    pub fn document_id(bike_id: &str, type_id: &str) -> String {
        format!("{}_{}", bike_id, type_id)
    }
}

/// Ordered, duplicate-free set of item-type identifiers carried by a record.
///
/// Older documents store the set as a single `", "`-joined string; both
/// shapes are accepted on read, and a list is always written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredItemTypes", into = "Vec<String>")]
pub struct ItemTypeSet(Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredItemTypes {
    Joined(String),
    List(Vec<String>),
}

impl From<StoredItemTypes> for ItemTypeSet {
    fn from(stored: StoredItemTypes) -> Self {
        match stored {
            StoredItemTypes::Joined(joined) => Self::split_joined(&joined),
            StoredItemTypes::List(ids) => ids.into_iter().collect(),
        }
    }
}

impl From<ItemTypeSet> for Vec<String> {
    fn from(set: ItemTypeSet) -> Self {
        set.0
    }
}

impl FromIterator<String> for ItemTypeSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = Self::default();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

impl ItemTypeSet {
    pub const JOIN_SEPARATOR: &'static str = ", ";

    /// Add an identifier, keeping first-seen order. Blank ids are ignored.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        let id = id.trim();
        if id.is_empty() || self.contains(id) {
            return false;
        }
        self.0.push(id.to_string());
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|existing| existing == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Split a delimiter-joined field (`"chain_lube, tires"`).
    pub fn split_joined(joined: &str) -> Self {
        joined.split(',').map(|part| part.trim().to_string()).collect()
    }

    /// Join for text boundaries.
    pub fn to_joined(&self) -> String {
        self.0.join(Self::JOIN_SEPARATOR)
    }
}

/// Part detail captured for one item type of a record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartDetail {
    pub type_id: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub other: String,
}

/// A service event on a bike.
///
/// Stored in `bike_maintenance`, keyed by `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    pub id: String,
    pub athlete_id: u64,
    pub bike_id: String,
    /// Item types serviced in this event
    #[serde(rename = "maintenance_type")]
    pub item_types: ItemTypeSet,
    pub service_date: NaiveDate,
    /// Bike odometer (km) on the service date
    pub mileage_at_service: f64,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub shop_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_diy: bool,
    #[serde(default)]
    pub other: Option<String>,
    /// Wheelset the service applied to, if any
    #[serde(default)]
    pub wheelset_id: Option<String>,
    #[serde(default)]
    pub parts_details: Vec<PartDetail>,
    /// Imported type labels that matched no known item type, kept verbatim
    /// for manual reconciliation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unresolved_labels: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_type_set_reads_joined_string() {
        let set: ItemTypeSet = serde_json::from_str(r#""chain_lube, tires""#).unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["chain_lube", "tires"]);
    }

    #[test]
    fn test_item_type_set_reads_list_and_drops_duplicates() {
        let set: ItemTypeSet =
            serde_json::from_str(r#"["tires", "chain_lube", "tires", " "]"#).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.to_joined(), "tires, chain_lube");
    }

    #[test]
    fn test_item_type_set_writes_list() {
        let set = ItemTypeSet::split_joined("brake_pads,cables");
        assert_eq!(
            serde_json::to_value(&set).unwrap(),
            serde_json::json!(["brake_pads", "cables"])
        );
    }

    #[test]
    fn test_setting_document_id_is_per_bike_and_type() {
        assert_eq!(
            MaintenanceSetting::document_id("b1", "chain_lube"),
            "b1_chain_lube"
        );
        assert_eq!(LifespanSetting::document_id("b1", "tires"), "b1_tires");
    }
}
