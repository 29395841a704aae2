//! LatLong directions API as a [`TravelTimeOracle`].
//!
//! The oracle trait is blocking, so the provider owns a small Tokio runtime
//! and blocks on the async `reqwest` call. Inside a multi-threaded runtime it
//! reuses the caller's handle through `block_in_place` instead; inside a
//! `current_thread` runtime the owned runtime is driven from a scoped thread.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use tracing::{debug, trace, warn};

use crate::config::constant::{LATLONG_BASE_URL, ORACLE_TIMEOUT_SECS};
use crate::config::Settings;
use crate::distance::oracle::{OracleError, RouteDuration, TravelTimeOracle};
use crate::domain::GeoPoint;

const AUTH_HEADER: &str = "X-Authorization-Token";
const DIRECTIONS_ENDPOINT: &str = "/directions.json";
const SUCCESS_CODE: i64 = 1001;

#[derive(Debug, Error)]
pub enum ProviderBuildError {
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LatLongConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl LatLongConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: LATLONG_BASE_URL.to_string(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(ORACLE_TIMEOUT_SECS),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl From<&Settings> for LatLongConfig {
    fn from(settings: &Settings) -> Self {
        Self::new(settings.api_key.clone())
            .with_base_url(settings.base_url.clone())
            .with_timeout(settings.timeout)
    }
}

/// Envelope shared by every LatLong endpoint.
#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    status: Option<String>,
    code: Option<i64>,
    message: Option<String>,
    data: Option<Value>,
}

impl ApiEnvelope {
    fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success") || self.code == Some(SUCCESS_CODE)
    }
}

pub struct LatLongOracle {
    client: Client,
    config: LatLongConfig,
    /// Always `Some` until drop.
    runtime: Option<Runtime>,
}

impl std::fmt::Debug for LatLongOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LatLongOracle")
            .field("base_url", &self.config.base_url)
            .field("timeout", &self.config.timeout)
            .finish_non_exhaustive()
    }
}

impl LatLongOracle {
    pub fn new(config: LatLongConfig) -> Result<Self, ProviderBuildError> {
        let client = Client::builder()
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            client,
            config,
            runtime: Some(runtime),
        })
    }

    fn directions_url(&self) -> String {
        format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            DIRECTIONS_ENDPOINT
        )
    }

    fn query_params(origin: GeoPoint, destination: GeoPoint) -> [(&'static str, String); 2] {
        [
            ("origin", format!("{},{}", origin.lat, origin.lng)),
            ("destination", format!("{},{}", destination.lat, destination.lng)),
        ]
    }

    async fn fetch_async(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<RouteDuration, OracleError> {
        let url = self.directions_url();
        let params = Self::query_params(origin, destination);
        trace!("GET {} {:?}", url, params);

        let response = self
            .client
            .get(&url)
            .header(AUTH_HEADER, &self.config.api_key)
            .query(&params)
            .send()
            .await
            .map_err(|e| self.convert_reqwest_error(&e, &url))?;

        let status = response.status();
        debug!("Received response: HTTP {}", status);
        if !status.is_success() {
            return Err(OracleError::Http {
                url,
                status: status.as_u16(),
            });
        }

        let envelope: ApiEnvelope = response.json().await.map_err(|e| OracleError::Parse {
            message: e.to_string(),
        })?;

        convert_envelope(envelope)
    }

    fn block_on_owned(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<RouteDuration, OracleError> {
        match &self.runtime {
            Some(runtime) => runtime.block_on(self.fetch_async(origin, destination)),
            None => Err(OracleError::Network {
                url: self.directions_url(),
                message: "provider runtime has shut down".to_string(),
            }),
        }
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> OracleError {
        if error.is_timeout() {
            return OracleError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }
        if let Some(status) = error.status() {
            return OracleError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
            };
        }
        OracleError::Network {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

fn convert_envelope(envelope: ApiEnvelope) -> Result<RouteDuration, OracleError> {
    if !envelope.is_success() {
        let message = envelope
            .message
            .clone()
            .or(envelope.status.clone())
            .unwrap_or_else(|| "unknown error".to_string());
        warn!("LatLong directions warning: {}", message);
        return Err(OracleError::Service { message });
    }

    let data = envelope.data.ok_or(OracleError::MissingDuration)?;
    let time = data
        .get("time")
        .and_then(scalar_text)
        .ok_or(OracleError::MissingDuration)?;
    let distance = data.get("distance").and_then(scalar_text);

    Ok(RouteDuration { time, distance })
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

impl TravelTimeOracle for LatLongOracle {
    fn route_duration(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<RouteDuration, OracleError> {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| {
                    handle.block_on(self.fetch_async(origin, destination))
                })
            }
            // A current_thread runtime cannot be blocked from its own thread.
            Ok(_) => std::thread::scope(|s| {
                s.spawn(|| self.block_on_owned(origin, destination))
                    .join()
                    .unwrap_or_else(|_| {
                        Err(OracleError::Network {
                            url: self.directions_url(),
                            message: "oracle worker thread panicked".to_string(),
                        })
                    })
            }),
            Err(_) => self.block_on_owned(origin, destination),
        }
    }
}

impl Drop for LatLongOracle {
    fn drop(&mut self) {
        // Dropping a runtime inside an async context panics; shut down without waiting.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}
