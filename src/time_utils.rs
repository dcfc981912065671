// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting and day arithmetic.

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Midnight UTC at the start of a calendar date.
///
/// Service dates are calendar days; they are compared against activity
/// timestamps as this instant.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Whole days from `start` to `end`, truncated (never rounded up).
///
/// Zero when `end` is not after `start`.
pub fn elapsed_whole_days(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    end.signed_duration_since(start).num_days().max(0)
}

/// Parse either a calendar date (`YYYY-MM-DD`) or an RFC3339 timestamp.
pub fn parse_date_or_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(start_of_day(date));
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
