// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Wheelset distance attribution.
//!
//! Each activity is credited to at most one wheelset:
//! 1. an explicit activity assignment, if one exists
//! 2. otherwise the wheelset of the activity's bike whose activation date is
//!    the latest one on or before the ride day (the next activation on the
//!    same bike ends the previous window)
//!
//! Activities matching neither stay unattributed. They still count towards
//! the bike total, just not towards any wheelset.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Activity, ActivityWheelsetAssignment, Wheelset};

/// Largest batch that still commits in a single transaction.
pub const MAX_BATCH_ASSIGNMENTS: usize = 400;

/// How an activity ended up on a wheelset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributionSource {
    Explicit,
    Inferred,
}

/// Wheelset resolved for a single activity.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedWheelset<'a> {
    pub wheelset: &'a Wheelset,
    pub source: AttributionSource,
}

/// Distance totals for one wheelset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WheelsetDistance {
    pub wheelset_id: String,
    pub name: String,
    pub bike_id: Option<String>,
    /// Distance carried in from before tracking (meters)
    pub baseline_m: f64,
    /// Distance from attributed activities (meters)
    pub attributed_m: f64,
    /// `baseline_m + attributed_m`
    pub total_m: f64,
    pub activity_count: usize,
}

/// Result of attributing a set of activities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attribution {
    pub wheelsets: Vec<WheelsetDistance>,
    /// Distance no wheelset accounts for (meters)
    pub unattributed_m: f64,
    pub unattributed_count: usize,
}

impl Attribution {
    pub fn wheelset(&self, wheelset_id: &str) -> Option<&WheelsetDistance> {
        self.wheelsets.iter().find(|w| w.wheelset_id == wheelset_id)
    }
}

/// Resolves activities to wheelsets for one athlete's snapshot.
pub struct WheelsetAttributor<'a> {
    wheelsets: &'a [Wheelset],
    explicit: HashMap<u64, &'a str>,
}

impl<'a> WheelsetAttributor<'a> {
    pub fn new(wheelsets: &'a [Wheelset], assignments: &'a [ActivityWheelsetAssignment]) -> Self {
        let explicit = assignments
            .iter()
            .map(|a| (a.activity_id, a.wheelset_id.as_str()))
            .collect();
        Self {
            wheelsets,
            explicit,
        }
    }

    fn find(&self, wheelset_id: &str) -> Option<&'a Wheelset> {
        self.wheelsets.iter().find(|w| w.id == wheelset_id)
    }

    /// Wheelset active on `bike_id` on `day`, from activation dates alone.
    ///
    /// When two wheelsets share an activation date the most recently
    /// updated one wins; remaining ties go to the later document.
    pub fn active_on(&self, bike_id: &str, day: NaiveDate) -> Option<&'a Wheelset> {
        self.wheelsets
            .iter()
            .filter(|w| w.bike_id.as_deref() == Some(bike_id))
            .filter_map(|w| w.active_date.filter(|d| *d <= day).map(|d| (d, w)))
            .max_by_key(|(d, w)| (*d, w.updated_at))
            .map(|(_, w)| w)
    }

    pub fn resolve(&self, activity: &Activity) -> Option<ResolvedWheelset<'a>> {
        if let Some(wheelset_id) = self.explicit.get(&activity.id) {
            match self.find(wheelset_id) {
                Some(wheelset) => {
                    return Some(ResolvedWheelset {
                        wheelset,
                        source: AttributionSource::Explicit,
                    })
                }
                None => tracing::warn!(
                    activity_id = activity.id,
                    wheelset_id = %wheelset_id,
                    "Assignment points at a missing wheelset, falling back to inference"
                ),
            }
        }

        let bike_id = activity.gear_id.as_deref()?;
        self.active_on(bike_id, activity.start_date.date_naive())
            .map(|wheelset| ResolvedWheelset {
                wheelset,
                source: AttributionSource::Inferred,
            })
    }

    /// Sum attributed distance per wheelset over `activities`.
    ///
    /// Every known wheelset appears in the result, even with nothing attributed.
    pub fn attribute(&self, activities: &[Activity]) -> Attribution {
        let mut totals: HashMap<&str, (f64, usize)> = HashMap::new();
        let mut attribution = Attribution::default();

        for activity in activities {
            match self.resolve(activity) {
                Some(resolved) => {
                    let entry = totals.entry(resolved.wheelset.id.as_str()).or_default();
                    entry.0 += activity.distance;
                    entry.1 += 1;
                }
                None => {
                    attribution.unattributed_m += activity.distance;
                    attribution.unattributed_count += 1;
                }
            }
        }

        attribution.wheelsets = self
            .wheelsets
            .iter()
            .map(|w| {
                let (attributed_m, activity_count) =
                    totals.get(w.id.as_str()).copied().unwrap_or_default();
                WheelsetDistance {
                    wheelset_id: w.id.clone(),
                    name: w.name.clone(),
                    bike_id: w.bike_id.clone(),
                    baseline_m: w.distance,
                    attributed_m,
                    total_m: w.distance + attributed_m,
                    activity_count,
                }
            })
            .collect();
        attribution
    }
}

/// One requested activity → wheelset assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRequest {
    pub activity_id: u64,
    pub wheelset_id: String,
}

/// Why a single entry of a batch was refused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum AssignmentFailure {
    UnknownActivity {
        activity_id: u64,
    },
    UnknownWheelset {
        activity_id: u64,
        wheelset_id: String,
    },
    WheelsetNotOnBike {
        activity_id: u64,
        wheelset_id: String,
        bike_id: Option<String>,
    },
    BeforeActivation {
        activity_id: u64,
        wheelset_id: String,
        active_date: NaiveDate,
    },
    ConflictingDuplicate {
        activity_id: u64,
    },
}

/// Batch assignment errors. Any failure rejects the whole batch.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssignmentError {
    #[error("Assignment batch is empty")]
    Empty,

    #[error("Assignment batch has {len} entries (max {max})")]
    TooLarge { len: usize, max: usize },

    #[error("Assignment batch rejected: {} invalid entries", failures.len())]
    Rejected { failures: Vec<AssignmentFailure> },
}

/// Validate a batch against the snapshot and turn it into assignments.
///
/// All-or-nothing: either every entry is valid and the full list is
/// returned, or nothing is and every failure is reported.
pub fn plan_assignments(
    athlete_id: u64,
    requests: &[AssignmentRequest],
    activities: &[Activity],
    wheelsets: &[Wheelset],
) -> Result<Vec<ActivityWheelsetAssignment>, AssignmentError> {
    if requests.is_empty() {
        return Err(AssignmentError::Empty);
    }
    if requests.len() > MAX_BATCH_ASSIGNMENTS {
        return Err(AssignmentError::TooLarge {
            len: requests.len(),
            max: MAX_BATCH_ASSIGNMENTS,
        });
    }

    let mut failures = Vec::new();
    let mut planned: Vec<ActivityWheelsetAssignment> = Vec::with_capacity(requests.len());

    for request in requests {
        if let Some(existing) = planned
            .iter()
            .find(|p| p.activity_id == request.activity_id)
        {
            if existing.wheelset_id != request.wheelset_id {
                failures.push(AssignmentFailure::ConflictingDuplicate {
                    activity_id: request.activity_id,
                });
            }
            continue;
        }

        match check_request(request, activities, wheelsets) {
            Ok(()) => planned.push(ActivityWheelsetAssignment {
                athlete_id,
                activity_id: request.activity_id,
                wheelset_id: request.wheelset_id.clone(),
            }),
            Err(failure) => failures.push(failure),
        }
    }

    if failures.is_empty() {
        Ok(planned)
    } else {
        Err(AssignmentError::Rejected { failures })
    }
}

fn check_request(
    request: &AssignmentRequest,
    activities: &[Activity],
    wheelsets: &[Wheelset],
) -> Result<(), AssignmentFailure> {
    let activity_id = request.activity_id;
    let activity = activities
        .iter()
        .find(|a| a.id == activity_id)
        .ok_or(AssignmentFailure::UnknownActivity { activity_id })?;
    let wheelset = wheelsets
        .iter()
        .find(|w| w.id == request.wheelset_id)
        .ok_or_else(|| AssignmentFailure::UnknownWheelset {
            activity_id,
            wheelset_id: request.wheelset_id.clone(),
        })?;

    let usable = activity
        .gear_id
        .as_deref()
        .map_or(wheelset.bike_id.is_none(), |bike| wheelset.is_usable_by(bike));
    if !usable {
        return Err(AssignmentFailure::WheelsetNotOnBike {
            activity_id,
            wheelset_id: wheelset.id.clone(),
            bike_id: activity.gear_id.clone(),
        });
    }

    if let Some(active_date) = wheelset.active_date {
        if activity.start_date.date_naive() < active_date {
            return Err(AssignmentFailure::BeforeActivation {
                activity_id,
                wheelset_id: wheelset.id.clone(),
                active_date,
            });
        }
    }
    Ok(())
}

/// Upsert planned assignments into an in-memory assignment list, keyed by activity.
pub fn apply_assignments(
    existing: &mut Vec<ActivityWheelsetAssignment>,
    planned: Vec<ActivityWheelsetAssignment>,
) {
    for assignment in planned {
        match existing
            .iter_mut()
            .find(|e| e.activity_id == assignment.activity_id)
        {
            Some(slot) => *slot = assignment,
            None => existing.push(assignment),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn wheelset(id: &str, bike: Option<&str>, active: Option<(i32, u32, u32)>) -> Wheelset {
        Wheelset {
            id: id.to_string(),
            athlete_id: 1,
            bike_id: bike.map(String::from),
            name: id.to_uppercase(),
            distance: 0.0,
            active_date: active.map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap()),
            updated_at: None,
        }
    }

    fn ride(id: u64, gear: Option<&str>, date: (i32, u32, u32), meters: f64) -> Activity {
        Activity {
            id,
            athlete_id: 1,
            name: String::new(),
            distance: meters,
            moving_time: 3600,
            total_elevation_gain: 0.0,
            start_date: Utc.with_ymd_and_hms(date.0, date.1, date.2, 9, 0, 0).unwrap(),
            gear_id: gear.map(String::from),
        }
    }

    fn assign(activity_id: u64, wheelset_id: &str) -> ActivityWheelsetAssignment {
        ActivityWheelsetAssignment {
            athlete_id: 1,
            activity_id,
            wheelset_id: wheelset_id.to_string(),
        }
    }

    #[test]
    fn test_inference_uses_activation_windows() {
        let wheelsets = vec![
            wheelset("a", Some("b1"), Some((2024, 1, 1))),
            wheelset("b", Some("b1"), Some((2024, 6, 1))),
        ];
        let attributor = WheelsetAttributor::new(&wheelsets, &[]);

        let day = |m, d| NaiveDate::from_ymd_opt(2024, m, d).unwrap();
        assert_eq!(attributor.active_on("b1", day(3, 1)).unwrap().id, "a");
        assert_eq!(attributor.active_on("b1", day(5, 31)).unwrap().id, "a");
        assert_eq!(attributor.active_on("b1", day(6, 1)).unwrap().id, "b");
        assert!(attributor
            .active_on("b1", NaiveDate::from_ymd_opt(2023, 12, 31).unwrap())
            .is_none());
        assert!(attributor.active_on("b2", day(3, 1)).is_none());
    }

    #[test]
    fn test_same_activation_date_most_recently_updated_wins() {
        let mut older = wheelset("older", Some("b1"), Some((2024, 1, 1)));
        older.updated_at = Some(Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap());
        let mut newer = wheelset("newer", Some("b1"), Some((2024, 1, 1)));
        newer.updated_at = Some(Utc.with_ymd_and_hms(2024, 2, 5, 0, 0, 0).unwrap());

        let wheelsets = vec![newer, older];
        let attributor = WheelsetAttributor::new(&wheelsets, &[]);
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(attributor.active_on("b1", day).unwrap().id, "newer");
    }

    #[test]
    fn test_explicit_assignment_beats_inference() {
        let wheelsets = vec![
            wheelset("a", Some("b1"), Some((2024, 1, 1))),
            wheelset("pool", None, None),
        ];
        let assignments = vec![assign(7, "pool")];
        let attributor = WheelsetAttributor::new(&wheelsets, &assignments);

        let resolved = attributor
            .resolve(&ride(7, Some("b1"), (2024, 3, 1), 1000.0))
            .unwrap();
        assert_eq!(resolved.wheelset.id, "pool");
        assert_eq!(resolved.source, AttributionSource::Explicit);

        let resolved = attributor
            .resolve(&ride(8, Some("b1"), (2024, 3, 1), 1000.0))
            .unwrap();
        assert_eq!(resolved.wheelset.id, "a");
        assert_eq!(resolved.source, AttributionSource::Inferred);
    }

    #[test]
    fn test_dangling_assignment_falls_back_to_inference() {
        let wheelsets = vec![wheelset("a", Some("b1"), Some((2024, 1, 1)))];
        let assignments = vec![assign(7, "deleted")];
        let attributor = WheelsetAttributor::new(&wheelsets, &assignments);

        let resolved = attributor
            .resolve(&ride(7, Some("b1"), (2024, 3, 1), 1000.0))
            .unwrap();
        assert_eq!(resolved.wheelset.id, "a");
    }

    #[test]
    fn test_totals_include_baseline_and_unattributed() {
        let mut a = wheelset("a", Some("b1"), Some((2024, 2, 1)));
        a.distance = 1_500_000.0;
        let wheelsets = vec![a, wheelset("idle", None, None)];
        let activities = vec![
            ride(1, Some("b1"), (2024, 1, 15), 30_000.0),
            ride(2, Some("b1"), (2024, 2, 3), 50_000.0),
            ride(3, Some("b1"), (2024, 2, 9), 70_000.0),
            ride(4, None, (2024, 2, 9), 5_000.0),
        ];
        let attribution = WheelsetAttributor::new(&wheelsets, &[]).attribute(&activities);

        let a = attribution.wheelset("a").unwrap();
        assert_eq!(a.attributed_m, 120_000.0);
        assert_eq!(a.total_m, 1_620_000.0);
        assert_eq!(a.activity_count, 2);

        let idle = attribution.wheelset("idle").unwrap();
        assert_eq!(idle.total_m, 0.0);
        assert_eq!(idle.activity_count, 0);

        assert_eq!(attribution.unattributed_m, 35_000.0);
        assert_eq!(attribution.unattributed_count, 2);
    }

    #[test]
    fn test_plan_rejects_whole_batch_on_any_failure() {
        let wheelsets = vec![
            wheelset("a", Some("b1"), Some((2024, 2, 1))),
            wheelset("other", Some("b2"), None),
        ];
        let activities = vec![
            ride(1, Some("b1"), (2024, 3, 1), 1000.0),
            ride(2, Some("b1"), (2024, 1, 1), 1000.0),
        ];
        let requests = vec![
            AssignmentRequest { activity_id: 1, wheelset_id: "a".into() },
            AssignmentRequest { activity_id: 2, wheelset_id: "a".into() },
            AssignmentRequest { activity_id: 1, wheelset_id: "other".into() },
            AssignmentRequest { activity_id: 99, wheelset_id: "a".into() },
        ];

        let failures = match plan_assignments(1, &requests, &activities, &wheelsets) {
            Err(AssignmentError::Rejected { failures }) => failures,
            other => panic!("expected rejection, got {:?}", other),
        };
        assert_eq!(failures.len(), 3);
        assert!(matches!(failures[0], AssignmentFailure::BeforeActivation { activity_id: 2, .. }));
        assert!(matches!(failures[1], AssignmentFailure::ConflictingDuplicate { activity_id: 1 }));
        assert!(matches!(failures[2], AssignmentFailure::UnknownActivity { activity_id: 99 }));
    }

    #[test]
    fn test_plan_rejects_wheelset_of_another_bike() {
        let wheelsets = vec![wheelset("other", Some("b2"), None)];
        let activities = vec![ride(1, Some("b1"), (2024, 3, 1), 1000.0)];
        let requests = vec![AssignmentRequest { activity_id: 1, wheelset_id: "other".into() }];

        let err = plan_assignments(1, &requests, &activities, &wheelsets).unwrap_err();
        assert!(matches!(
            err,
            AssignmentError::Rejected { ref failures }
                if matches!(failures[0], AssignmentFailure::WheelsetNotOnBike { .. })
        ));
    }

    #[test]
    fn test_plan_limits() {
        assert_eq!(plan_assignments(1, &[], &[], &[]), Err(AssignmentError::Empty));

        let requests: Vec<AssignmentRequest> = (0..=MAX_BATCH_ASSIGNMENTS as u64)
            .map(|id| AssignmentRequest { activity_id: id, wheelset_id: "a".into() })
            .collect();
        assert!(matches!(
            plan_assignments(1, &requests, &[], &[]),
            Err(AssignmentError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_apply_assignments_upserts_by_activity() {
        let mut existing = vec![assign(1, "a"), assign(2, "a")];
        apply_assignments(&mut existing, vec![assign(2, "b"), assign(3, "b")]);
        assert_eq!(existing, vec![assign(1, "a"), assign(2, "b"), assign(3, "b")]);
    }
}
