//! Deterministic oracle doubles for tests.

use std::cell::RefCell;

use crate::distance::oracle::{OracleError, RouteDuration, TravelTimeOracle};
use crate::domain::GeoPoint;

#[derive(Debug, Clone)]
enum StubMode {
    Constant(String),
    Failing,
    /// Whole minutes proportional to planar degree distance, plus a base.
    Distance { base_min: f64, min_per_degree: f64 },
}

/// Oracle stub that records every query it receives.
#[derive(Debug)]
pub struct StubOracle {
    mode: StubMode,
    queries: RefCell<Vec<(GeoPoint, GeoPoint)>>,
}

impl StubOracle {
    /// Answer every query with the same text.
    pub fn constant(text: impl Into<String>) -> Self {
        Self::with_mode(StubMode::Constant(text.into()))
    }

    /// Fail every query with a network error.
    pub fn failing() -> Self {
        Self::with_mode(StubMode::Failing)
    }

    /// Answer with `base_min + min_per_degree * distance` rounded to whole minutes.
    pub fn by_distance(base_min: f64, min_per_degree: f64) -> Self {
        Self::with_mode(StubMode::Distance {
            base_min,
            min_per_degree,
        })
    }

    fn with_mode(mode: StubMode) -> Self {
        Self {
            mode,
            queries: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.queries.borrow().len()
    }

    pub fn queries(&self) -> Vec<(GeoPoint, GeoPoint)> {
        self.queries.borrow().clone()
    }
}

impl TravelTimeOracle for StubOracle {
    fn route_duration(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<RouteDuration, OracleError> {
        self.queries.borrow_mut().push((origin, destination));
        match &self.mode {
            StubMode::Constant(text) => Ok(RouteDuration::new(text.clone())),
            StubMode::Failing => Err(OracleError::Network {
                url: "stub://directions".to_string(),
                message: "connection refused".to_string(),
            }),
            StubMode::Distance {
                base_min,
                min_per_degree,
            } => {
                let dist = ((origin.lat - destination.lat).powi(2)
                    + (origin.lng - destination.lng).powi(2))
                .sqrt();
                let total = (base_min + min_per_degree * dist).round().max(0.0) as u64;
                let (hours, mins) = (total / 60, total % 60);
                let text = if hours > 0 {
                    format!("{} hour, {} minutes", hours, mins)
                } else {
                    format!("{} mins", mins)
                };
                Ok(RouteDuration::new(text))
            }
        }
    }
}
