// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Maintenance-Tracker: bike maintenance status and usage attribution
//!
//! This crate provides the backend API that turns synced activities,
//! service records and per-bike overrides into maintenance reminders,
//! ride metrics and per-wheelset distance totals.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
}
