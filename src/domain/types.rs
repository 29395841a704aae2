use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Shift by whole grid steps.
    pub fn offset(&self, dlat: f64, dlng: f64) -> Self {
        Self {
            lat: self.lat + dlat,
            lng: self.lng + dlng,
        }
    }
}

/// Someone travelling to the meeting point.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Person {
    #[serde(rename = "user_id")]
    pub id: String,
    pub lat: f64,
    pub lng: f64,
}

impl Person {
    pub fn new(id: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            id: id.into(),
            lat,
            lng,
        }
    }

    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

/// Aggregate fairness figures for one vector of travel times (minutes).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub avg: f64,
    /// Population standard deviation; the equality score.
    pub std: f64,
    pub max: f64,
    pub min: f64,
    pub spread: f64,
    pub score: f64,
}

/// One evaluated candidate point.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub point: GeoPoint,
    pub minutes: Vec<f64>,
    pub metrics: Metrics,
}

/// A Phase-2 candidate offered as an alternative meeting point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CandidateSpot {
    pub lat: f64,
    pub lng: f64,
    pub score: f64,
    pub equality_score: f64,
    pub avg_time: f64,
    pub max_time: f64,
    pub min_time: f64,
    pub time_spread: f64,
}

impl From<&Evaluation> for CandidateSpot {
    fn from(eval: &Evaluation) -> Self {
        Self {
            lat: eval.point.lat,
            lng: eval.point.lng,
            score: eval.metrics.score,
            equality_score: eval.metrics.std,
            avg_time: eval.metrics.avg,
            max_time: eval.metrics.max,
            min_time: eval.metrics.min,
            time_spread: eval.metrics.spread,
        }
    }
}

/// Row of the per-person travel time table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonTime {
    pub user_id: String,
    pub lat: f64,
    pub lng: f64,
    /// Rounded to one decimal for display.
    pub travel_time_min: f64,
    /// Signed difference from the group average, one decimal.
    pub deviation_min: f64,
}

/// Call accounting per search phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PhaseStats {
    pub phase1_calls: usize,
    pub phase2_calls: usize,
    pub validation_calls: usize,
    /// Grid size computed from the remaining budget (may be negative).
    pub grid_size: i64,
    pub phase2_ran: bool,
    /// Oracle calls that failed and were charged the penalty.
    pub oracle_failures: usize,
    /// Oracle durations not in the provider's comma-split format.
    pub format_mismatches: usize,
    /// Whether every budgeted call was spent.
    pub budget_exhausted: bool,
}

/// Bounding extent of the group, in degrees and approximate kilometres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoSpread {
    pub lat_range: f64,
    pub lng_range: f64,
    pub lat_km: f64,
    pub lng_km: f64,
}

/// Hint that the group is too spread out for a fairer point to exist.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpreadInsight {
    pub equality_score: f64,
    /// Largest planar distance between two people, in degrees.
    pub max_pair_distance: f64,
}

/// Everything the search reports back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationOutcome {
    pub equal_point: GeoPoint,
    /// Unrounded final per-person minutes, in input order.
    pub travel_times_min: Vec<f64>,
    pub user_times: Vec<PersonTime>,
    pub equality_score: f64,
    pub avg_time_min: f64,
    pub max_time_min: f64,
    pub min_time_min: f64,
    pub time_spread: f64,
    pub score: f64,
    pub n_api_calls: usize,
    pub alternative_spots: Vec<CandidateSpot>,
    pub phases: PhaseStats,
    pub spread: GeoSpread,
    pub insight: Option<SpreadInsight>,
}
