// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Threshold resolution: effective interval and lifespan for a bike/item pair.
//!
//! Settings are passed in as a snapshot; nothing here caches across calls.

use crate::models::{IntervalSource, LifespanSetting, MaintenanceItemType, MaintenanceSetting};

/// Effective limits for one (bike, item type) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Distance between services, in kilometers (always > 0)
    pub interval_km: f64,
    pub interval_source: IntervalSource,
    /// Lifespan in kilometers, `None` when untracked
    pub lifespan_km: Option<f64>,
    /// Lifespan in days, `None` when untracked
    pub lifespan_days: Option<u32>,
    /// Lifespan in meters of climbing, `None` when untracked
    pub climbing_m: Option<f64>,
}

/// Resolve the thresholds in force for `bike_id` and `item_type`.
///
/// The interval comes from, in order: a bike override, the type's estimated
/// lifespan, the type default. An override replaces the type values
/// outright. If several override documents exist for the same pair, the most
/// recently written one is used.
pub fn resolve_thresholds(
    bike_id: &str,
    item_type: &MaintenanceItemType,
    settings: &[MaintenanceSetting],
    lifespans: &[LifespanSetting],
) -> Result<Thresholds, ThresholdError> {
    let setting = latest_by(
        settings
            .iter()
            .filter(|s| s.bike_id == bike_id && s.maintenance_type_id == item_type.id),
        |s| s.updated_at,
    );

    let (interval_km, interval_source) = match setting {
        Some(s) => {
            if !is_usable_interval(s.custom_interval_km) {
                return Err(ThresholdError::InvalidOverrideInterval {
                    bike_id: bike_id.to_string(),
                    item_type_id: item_type.id.clone(),
                    value: s.custom_interval_km,
                });
            }
            (s.custom_interval_km, IntervalSource::BikeOverride)
        }
        None => match (item_type.estimated_lifespan_km, item_type.default_interval_km) {
            (Some(km), _) if is_usable_interval(km) => (km, IntervalSource::TypeEstimate),
            (_, Some(km)) if is_usable_interval(km) => (km, IntervalSource::TypeDefault),
            (_, value) => {
                return Err(ThresholdError::InvalidDefaultInterval {
                    item_type_id: item_type.id.clone(),
                    value,
                })
            }
        },
    };

    let lifespan = latest_by(
        lifespans
            .iter()
            .filter(|l| l.bike_id == bike_id && l.maintenance_type_id == item_type.id),
        |l| l.updated_at,
    );

    Ok(Thresholds {
        interval_km,
        interval_source,
        lifespan_km: lifespan
            .and_then(|l| l.lifespan_km)
            .filter(|km| *km > 0.0),
        lifespan_days: lifespan
            .and_then(|l| l.lifespan_days)
            .filter(|days| *days > 0),
        climbing_m: item_type
            .climbing_lifespan_m
            .filter(|m| is_usable_interval(*m)),
    })
}

fn is_usable_interval(km: f64) -> bool {
    km.is_finite() && km > 0.0
}

/// Pick the latest item by timestamp; on ties (or missing timestamps) the
/// one later in the collection wins.
fn latest_by<'a, T, K, F>(items: impl Iterator<Item = &'a T>, key: F) -> Option<&'a T>
where
    T: 'a,
    K: Ord,
    F: Fn(&T) -> K,
{
    items.fold(None, |best, item| match best {
        Some(current) if key(current) > key(item) => Some(current),
        _ => Some(item),
    })
}

/// Data-integrity faults in threshold reference data.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ThresholdError {
    #[error("Item type {item_type_id} has no usable default interval ({value:?})")]
    InvalidDefaultInterval {
        item_type_id: String,
        value: Option<f64>,
    },

    #[error("Bike {bike_id} overrides {item_type_id} with a non-positive interval ({value})")]
    InvalidOverrideInterval {
        bike_id: String,
        item_type_id: String,
        value: f64,
    },
}
