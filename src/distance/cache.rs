use std::collections::HashMap;

use tracing::{debug, trace, warn};

use crate::config::constant::{CACHE_KEY_PRECISION, PENALTY_SECONDS};
use crate::distance::duration::{parse_duration_seconds, parse_minutes_split};
use crate::distance::oracle::TravelTimeOracle;
use crate::domain::GeoPoint;

/// Cache key for a directed lookup. `a -> b` and `b -> a` are different keys.
pub fn cache_key(origin: GeoPoint, destination: GeoPoint) -> String {
    let p = CACHE_KEY_PRECISION;
    format!(
        "{:.p$}_{:.p$}_{:.p$}_{:.p$}",
        origin.lat, origin.lng, destination.lat, destination.lng
    )
}

/// Per-run lookup state: the memo table and the oracle call budget.
///
/// Create one per optimization run and never share it across runs; the budget
/// only means something for a single group.
pub struct RunContext<O> {
    oracle: O,
    cache: HashMap<String, u64>,
    max_calls: usize,
    misses: usize,
    calls_made: usize,
    failures: usize,
    format_mismatches: usize,
}

impl<O: TravelTimeOracle> RunContext<O> {
    pub fn new(oracle: O, max_calls: usize) -> Self {
        Self {
            oracle,
            cache: HashMap::new(),
            max_calls,
            misses: 0,
            calls_made: 0,
            failures: 0,
            format_mismatches: 0,
        }
    }

    /// Travel time in seconds from `origin` to `destination`.
    ///
    /// Hits cost nothing. A miss bumps the counter before anything else; once
    /// the counter is past the budget the oracle is not called and the penalty
    /// is returned without being stored. Oracle failures also yield the
    /// penalty, which is stored since the call was spent.
    pub fn get_or_compute(&mut self, origin: GeoPoint, destination: GeoPoint) -> u64 {
        let key = cache_key(origin, destination);
        if let Some(&seconds) = self.cache.get(&key) {
            trace!("cache hit {} -> {}s", key, seconds);
            return seconds;
        }

        self.misses += 1;
        if self.misses > self.max_calls {
            warn!(
                "API limit reached ({} calls), using {}s penalty for {}",
                self.max_calls, PENALTY_SECONDS, key
            );
            return PENALTY_SECONDS;
        }

        self.calls_made += 1;
        let seconds = match self.oracle.route_duration(origin, destination) {
            Ok(route) => {
                let seconds = parse_duration_seconds(&route.time);
                if parse_minutes_split(&route.time).saturating_mul(60) != seconds {
                    self.format_mismatches += 1;
                    debug!("Duration {:?} is not in the comma-split format", route.time);
                }
                seconds
            }
            Err(e) => {
                self.failures += 1;
                warn!("Route lookup failed for {}: {}; using penalty", key, e);
                PENALTY_SECONDS
            }
        };
        trace!("cache store {} -> {}s", key, seconds);
        self.cache.insert(key, seconds);
        seconds
    }

    /// Oracle calls actually sent. Never above the budget.
    pub fn calls_used(&self) -> usize {
        self.calls_made
    }

    /// Raw miss counter, including misses denied by the budget.
    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Durations the comma-split reading disagreed with.
    pub fn format_mismatches(&self) -> usize {
        self.format_mismatches
    }

    pub fn max_calls(&self) -> usize {
        self.max_calls
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    pub fn budget_exhausted(&self) -> bool {
        self.misses >= self.max_calls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubOracle;
    use rstest::{fixture, rstest};

    #[fixture]
    fn a() -> GeoPoint {
        GeoPoint::new(12.9279, 77.6276)
    }

    #[fixture]
    fn b() -> GeoPoint {
        GeoPoint::new(12.9650, 77.6400)
    }

    #[rstest]
    fn key_uses_six_decimals() {
        let key = cache_key(GeoPoint::new(1.0, 2.5), GeoPoint::new(-3.1234567, 4.0));
        assert_eq!(key, "1.000000_2.500000_-3.123457_4.000000");
    }

    #[rstest]
    fn nearby_points_share_a_key(a: GeoPoint, b: GeoPoint) {
        let nudged = GeoPoint::new(a.lat + 1e-9, a.lng);
        assert_eq!(cache_key(a, b), cache_key(nudged, b));
    }

    #[rstest]
    fn hit_does_not_call_oracle(a: GeoPoint, b: GeoPoint) {
        let oracle = StubOracle::constant("10 minutes");
        let mut ctx = RunContext::new(&oracle, 45);
        assert_eq!(ctx.get_or_compute(a, b), 600);
        assert_eq!(ctx.get_or_compute(a, b), 600);
        assert_eq!(oracle.calls(), 1);
        assert_eq!(ctx.calls_used(), 1);
        assert_eq!(ctx.misses(), 1);
    }

    #[rstest]
    fn lookups_are_directional(a: GeoPoint, b: GeoPoint) {
        let oracle = StubOracle::constant("10 minutes");
        let mut ctx = RunContext::new(&oracle, 45);
        ctx.get_or_compute(a, b);
        ctx.get_or_compute(b, a);
        assert_eq!(oracle.calls(), 2);
        assert_eq!(ctx.cached_entries(), 2);
    }

    #[rstest]
    fn budget_denies_the_call_that_crosses_the_limit() {
        let oracle = StubOracle::constant("5 mins");
        let mut ctx = RunContext::new(&oracle, 3);
        let dest = GeoPoint::new(0.0, 0.0);
        let results: Vec<u64> = (0..5)
            .map(|i| ctx.get_or_compute(GeoPoint::new(i as f64, 0.0), dest))
            .collect();
        assert_eq!(results, vec![300, 300, 300, 900, 900]);
        assert_eq!(oracle.calls(), 3);
        assert_eq!(ctx.calls_used(), 3);
        assert_eq!(ctx.misses(), 5);
        assert!(ctx.budget_exhausted());
        // denied lookups are not memoized
        assert_eq!(ctx.cached_entries(), 3);
    }

    #[rstest]
    fn oracle_failure_is_penalised_and_stored(a: GeoPoint, b: GeoPoint) {
        let oracle = StubOracle::failing();
        let mut ctx = RunContext::new(&oracle, 45);
        assert_eq!(ctx.get_or_compute(a, b), PENALTY_SECONDS);
        assert_eq!(ctx.get_or_compute(a, b), PENALTY_SECONDS);
        assert_eq!(oracle.calls(), 1);
        assert_eq!(ctx.failures(), 1);
    }

    #[rstest]
    #[case("1 hour, 10 minutes", 0)]
    #[case("10 minutes", 0)]
    #[case("25 mins", 1)]
    fn off_format_durations_are_counted(
        a: GeoPoint,
        b: GeoPoint,
        #[case] text: &str,
        #[case] expected: usize,
    ) {
        let oracle = StubOracle::constant(text);
        let mut ctx = RunContext::new(&oracle, 45);
        ctx.get_or_compute(a, b);
        ctx.get_or_compute(a, b);
        assert_eq!(ctx.format_mismatches(), expected);
    }

    #[rstest]
    fn zero_duration_is_not_a_failure(a: GeoPoint, b: GeoPoint) {
        let oracle = StubOracle::constant("");
        let mut ctx = RunContext::new(&oracle, 45);
        assert_eq!(ctx.get_or_compute(a, b), 0);
        assert_eq!(ctx.failures(), 0);
    }
}
