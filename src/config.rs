// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Only read activities from the last N days. `None` reads the full
    /// history, which exact odometer reconstruction needs.
    pub activity_lookback_days: Option<u32>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            gcp_project_id: "test-project".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            activity_lookback_days: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            gcp_project_id: env::var("GCP_PROJECT_ID")
                .map_err(|_| ConfigError::Missing("GCP_PROJECT_ID"))?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: match env::var("PORT") {
                Ok(raw) => raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::Invalid("PORT", raw))?,
                Err(_) => 8080,
            },
            activity_lookback_days: match env::var("ACTIVITY_LOOKBACK_DAYS") {
                Ok(raw) if raw.trim().is_empty() => None,
                Ok(raw) => Some(
                    raw.trim()
                        .parse()
                        .ok()
                        .filter(|days: &u32| *days > 0)
                        .ok_or(ConfigError::Invalid("ACTIVITY_LOOKBACK_DAYS", raw))?,
                ),
                Err(_) => None,
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
