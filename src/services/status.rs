// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Usage percentage and three-state status classification.

use crate::models::{AxisUsage, ServiceStatus};

/// Usage percentage at which an item becomes due soon.
pub const DUE_SOON_PERCENT: f64 = 85.0;
/// Usage percentage at which an item is overdue.
pub const OVERDUE_PERCENT: f64 = 100.0;

/// Classify a usage percentage.
pub fn classify(percentage: f64) -> ServiceStatus {
    if percentage >= OVERDUE_PERCENT {
        ServiceStatus::Overdue
    } else if percentage >= DUE_SOON_PERCENT {
        ServiceStatus::DueSoon
    } else {
        ServiceStatus::Ok
    }
}

/// Distance axis: usage since the last service against `limit_km`.
///
/// `last_service_km` of `None` means the item was never serviced, so the
/// whole odometer counts. A last service ahead of the current reading is
/// computed as-is (negative usage) and flagged.
pub fn distance_usage(current_km: f64, last_service_km: Option<f64>, limit_km: f64) -> AxisUsage {
    let used = current_km - last_service_km.unwrap_or(0.0);
    let percentage = used / limit_km * 100.0;
    AxisUsage {
        used,
        limit: limit_km,
        percentage,
        status: classify(percentage),
        inverted_history: used < 0.0,
    }
}

/// Climbing axis: elevation gain (m) ridden since the last service.
pub fn climbing_usage(used_m: f64, limit_m: f64) -> AxisUsage {
    let percentage = used_m / limit_m * 100.0;
    AxisUsage {
        used: used_m,
        limit: limit_m,
        percentage,
        status: classify(percentage),
        inverted_history: false,
    }
}

/// Time axis: whole days elapsed since the last service against a lifespan.
pub fn time_usage(elapsed_days: i64, lifespan_days: u32) -> AxisUsage {
    let used = elapsed_days as f64;
    let percentage = used / f64::from(lifespan_days) * 100.0;
    AxisUsage {
        used,
        limit: f64::from(lifespan_days),
        percentage,
        status: classify(percentage),
        inverted_history: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_are_exact() {
        assert_eq!(classify(84.999_999), ServiceStatus::Ok);
        assert_eq!(classify(85.0), ServiceStatus::DueSoon);
        assert_eq!(classify(99.999_999), ServiceStatus::DueSoon);
        assert_eq!(classify(100.0), ServiceStatus::Overdue);
        assert_eq!(classify(250.0), ServiceStatus::Overdue);
    }

    #[test]
    fn test_distance_usage_overdue_at_full_interval() {
        let usage = distance_usage(5000.0, Some(3000.0), 2000.0);
        assert_eq!(usage.used, 2000.0);
        assert_eq!(usage.percentage, 100.0);
        assert_eq!(usage.status, ServiceStatus::Overdue);
        assert!(!usage.inverted_history);
    }

    #[test]
    fn test_never_serviced_uses_whole_odometer() {
        let usage = distance_usage(1700.0, None, 2000.0);
        assert_eq!(usage.used, 1700.0);
        assert_eq!(usage.status, ServiceStatus::DueSoon);
    }

    #[test]
    fn test_serviced_at_zero_matches_never_serviced_numerically() {
        assert_eq!(
            distance_usage(900.0, Some(0.0), 1000.0).percentage,
            distance_usage(900.0, None, 1000.0).percentage
        );
    }

    #[test]
    fn test_inverted_history_is_flagged_not_clamped() {
        let usage = distance_usage(4000.0, Some(4500.0), 1000.0);
        assert_eq!(usage.used, -500.0);
        assert_eq!(usage.percentage, -50.0);
        assert_eq!(usage.status, ServiceStatus::Ok);
        assert!(usage.inverted_history);
    }

    #[test]
    fn test_status_is_monotonic_in_distance() {
        let mut previous = ServiceStatus::Ok;
        for step in 0..=300 {
            let current = 3000.0 + f64::from(step) * 10.0;
            let usage = distance_usage(current, Some(3000.0), 2000.0);
            assert!(usage.status >= previous);
            assert!((usage.percentage - (current - 3000.0) / 20.0).abs() < 1e-9);
            previous = usage.status;
        }
        assert_eq!(previous, ServiceStatus::Overdue);
    }

    #[test]
    fn test_climbing_usage_classifies_like_distance() {
        let usage = climbing_usage(27_000.0, 30_000.0);
        assert!((usage.percentage - 90.0).abs() < 1e-9);
        assert_eq!(usage.status, ServiceStatus::DueSoon);
        assert_eq!(usage.limit, 30_000.0);
        assert_eq!(climbing_usage(0.0, 30_000.0).status, ServiceStatus::Ok);
        assert_eq!(climbing_usage(31_000.0, 30_000.0).status, ServiceStatus::Overdue);
    }

    #[test]
    fn test_time_usage_overdue_after_lifespan() {
        let usage = time_usage(200, 180);
        assert_eq!(usage.status, ServiceStatus::Overdue);
        assert_eq!(usage.limit, 180.0);

        assert_eq!(time_usage(160, 180).status, ServiceStatus::DueSoon);
        assert_eq!(time_usage(10, 180).status, ServiceStatus::Ok);
    }
}
