use tracing::debug;

use crate::distance::{RunContext, TravelTimeOracle};
use crate::domain::{Evaluation, GeoPoint, Person};
use crate::evaluation::fitness::find_fitness;

/// Travel minutes from `candidate` to each person, in input order.
///
/// Unrounded; each cache miss may spend one oracle call from `ctx`.
pub fn travel_minutes<O: TravelTimeOracle>(
    candidate: GeoPoint,
    people: &[Person],
    ctx: &mut RunContext<O>,
) -> Vec<f64> {
    people
        .iter()
        .map(|person| ctx.get_or_compute(candidate, person.location()) as f64 / 60.0)
        .collect()
}

/// Look up travel times for `candidate` and score them.
pub fn evaluate<O: TravelTimeOracle>(
    candidate: GeoPoint,
    people: &[Person],
    ctx: &mut RunContext<O>,
) -> Evaluation {
    let minutes = travel_minutes(candidate, people, ctx);
    let metrics = find_fitness(&minutes);
    debug!(
        "({:.5}, {:.5}): Std={:.1}min, Range={:.0}-{:.0}min, Score={:.0}",
        candidate.lat, candidate.lng, metrics.std, metrics.min, metrics.max, metrics.score
    );
    Evaluation {
        point: candidate,
        minutes,
        metrics,
    }
}
