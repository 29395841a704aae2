use itertools::Itertools;

use crate::config::constant::{INSIGHT_STD_THRESHOLD, KM_PER_DEGREE, TOP_ALTERNATIVES};
use crate::domain::{
    CandidateSpot, Evaluation, GeoSpread, OptimizationOutcome, Person, PersonTime, PhaseStats,
    SpreadInsight,
};
use crate::utils::{mean, range, round_to};

/// Lowest-scoring Phase-2 candidates, best first. Equal scores keep grid order.
pub fn top_alternatives(candidates: &[Evaluation], k: usize) -> Vec<CandidateSpot> {
    candidates
        .iter()
        .map(CandidateSpot::from)
        .sorted_by(|a, b| a.score.total_cmp(&b.score))
        .take(k)
        .collect()
}

pub fn geo_spread(people: &[Person]) -> GeoSpread {
    let lats: Vec<f64> = people.iter().map(|p| p.lat).collect();
    let lngs: Vec<f64> = people.iter().map(|p| p.lng).collect();
    let lat_range = range(&lats);
    let lng_range = range(&lngs);
    let mean_lat = mean(&lats).to_radians();
    GeoSpread {
        lat_range,
        lng_range,
        lat_km: lat_range * KM_PER_DEGREE,
        lng_km: lng_range * KM_PER_DEGREE * mean_lat.cos(),
    }
}

/// Largest planar degree distance between any two people.
pub fn max_pair_distance(people: &[Person]) -> f64 {
    people
        .iter()
        .tuple_combinations()
        .map(|(a, b)| ((a.lat - b.lat).powi(2) + (a.lng - b.lng).powi(2)).sqrt())
        .fold(0.0, f64::max)
}

pub fn spread_insight(people: &[Person], equality_score: f64) -> Option<SpreadInsight> {
    (equality_score > INSIGHT_STD_THRESHOLD).then(|| SpreadInsight {
        equality_score,
        max_pair_distance: max_pair_distance(people),
    })
}

/// Package the final validation into the outcome. Inputs are left untouched.
pub fn assemble_outcome(
    people: &[Person],
    final_eval: &Evaluation,
    phase2_candidates: &[Evaluation],
    n_api_calls: usize,
    phases: PhaseStats,
) -> OptimizationOutcome {
    let m = &final_eval.metrics;
    let user_times = people
        .iter()
        .zip(&final_eval.minutes)
        .map(|(person, &minutes)| PersonTime {
            user_id: person.id.clone(),
            lat: person.lat,
            lng: person.lng,
            travel_time_min: round_to(minutes, 1),
            deviation_min: round_to(round_to(minutes, 1) - m.avg, 1),
        })
        .collect();

    OptimizationOutcome {
        equal_point: final_eval.point,
        travel_times_min: final_eval.minutes.clone(),
        user_times,
        equality_score: m.std,
        avg_time_min: m.avg,
        max_time_min: m.max,
        min_time_min: m.min,
        time_spread: m.spread,
        score: m.score,
        n_api_calls,
        alternative_spots: top_alternatives(phase2_candidates, TOP_ALTERNATIVES),
        phases,
        spread: geo_spread(people),
        insight: spread_insight(people, m.std),
    }
}
