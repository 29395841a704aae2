use std::env;
use std::time::Duration;

use dotenv::dotenv;
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod constant {
    /// Oracle calls allowed per optimization run.
    pub const MAX_API_CALLS: usize = 45;
    /// Stand-in travel time when no real duration can be obtained (15 minutes).
    pub const PENALTY_SECONDS: u64 = 900;
    /// Decimal places kept in cache keys.
    pub const CACHE_KEY_PRECISION: usize = 6;
    pub const TOP_ALTERNATIVES: usize = 5;

    pub const MAX_GRID_SIZE: i64 = 12;
    pub const MIN_GRID_SIZE: i64 = 9;
    pub const BIAS_FRACTION: f64 = 0.2;
    pub const STEP_FRACTION: f64 = 0.15;
    pub const MIN_STEP_DEGREES: f64 = 0.005;

    pub const STD_WEIGHT: f64 = 50.0;
    pub const MAX_WEIGHT: f64 = 2.0;

    /// Above this equality score (minutes) the outcome carries a spread insight.
    pub const INSIGHT_STD_THRESHOLD: f64 = 8.0;
    pub const KM_PER_DEGREE: f64 = 111.0;

    pub const ORACLE_TIMEOUT_SECS: u64 = 10;
    pub const LATLONG_BASE_URL: &str = "https://apihub.latlong.ai/v4";

    pub const RANDOM_GROUP_SEED: u64 = 12345;
    pub const RANDOM_GROUP_RADIUS_DEGREES: f64 = 0.05;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("LATLONG_API_KEY is not set (checked the environment and .env)")]
    MissingApiKey,
    #[error("invalid value {value:?} for {name}")]
    InvalidValue { name: &'static str, value: String },
}

/// Runtime settings for the HTTP oracle and the call budget.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
    pub max_api_calls: usize,
}

impl Settings {
    /// Load settings from the process environment after reading `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build settings from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = match lookup("LATLONG_API_KEY") {
            Some(key) if !key.trim().is_empty() => {
                info!("Loaded LatLong API key from environment");
                key.trim().to_string()
            }
            _ => return Err(ConfigError::MissingApiKey),
        };

        let base_url = lookup("LATLONG_BASE_URL").unwrap_or_else(|| {
            debug!("LATLONG_BASE_URL not set, using {}", constant::LATLONG_BASE_URL);
            constant::LATLONG_BASE_URL.to_string()
        });

        let timeout_secs = parse_var(&lookup, "ORACLE_TIMEOUT_SECS", constant::ORACLE_TIMEOUT_SECS)?;
        let max_api_calls = parse_var(&lookup, "MAX_API_CALLS", constant::MAX_API_CALLS)?;
        if max_api_calls == 0 {
            warn!("MAX_API_CALLS must be at least 1");
            return Err(ConfigError::InvalidValue {
                name: "MAX_API_CALLS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            api_key,
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            max_api_calls,
        })
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            name,
            value: raw,
        }),
    }
}
