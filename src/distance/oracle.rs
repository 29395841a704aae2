//! The travel-time oracle seam.
//!
//! An oracle answers "how long does it take to get from here to there" with
//! the provider's free-text description. Parsing that text and deciding what
//! to do on failure is the caller's business (see [`crate::distance::cache`]).

use thiserror::Error;

use crate::domain::GeoPoint;

/// A successful route lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDuration {
    /// Provider text such as `"1 hour, 10 minutes"`.
    pub time: String,
    pub distance: Option<String>,
}

impl RouteDuration {
    pub fn new(time: impl Into<String>) -> Self {
        Self {
            time: time.into(),
            distance: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },
    #[error("request to {url} returned HTTP {status}")]
    Http { url: String, status: u16 },
    #[error("provider rejected the request: {message}")]
    Service { message: String },
    #[error("could not decode provider response: {message}")]
    Parse { message: String },
    #[error("provider response has no travel time")]
    MissingDuration,
}

/// Anything that can answer a single origin → destination travel-time query.
///
/// Calls are blocking. Implementations should enforce their own per-request
/// deadline and report it as [`OracleError::Timeout`].
pub trait TravelTimeOracle {
    fn route_duration(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<RouteDuration, OracleError>;
}

impl<T: TravelTimeOracle + ?Sized> TravelTimeOracle for &T {
    fn route_duration(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<RouteDuration, OracleError> {
        (**self).route_duration(origin, destination)
    }
}

impl<T: TravelTimeOracle + ?Sized> TravelTimeOracle for Box<T> {
    fn route_duration(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<RouteDuration, OracleError> {
        (**self).route_duration(origin, destination)
    }
}
