use tracing::{debug, info};

use crate::config::constant::BIAS_FRACTION;
use crate::distance::{RunContext, TravelTimeOracle};
use crate::domain::{Evaluation, GeoPoint, Person};
use crate::evaluation::evaluate;
use crate::utils::{mean, median, range};

/// The six structural starting points, in evaluation order.
pub fn starting_candidates(people: &[Person]) -> [(&'static str, GeoPoint); 6] {
    let lats: Vec<f64> = people.iter().map(|p| p.lat).collect();
    let lngs: Vec<f64> = people.iter().map(|p| p.lng).collect();

    let center = GeoPoint::new(mean(&lats), mean(&lngs));
    let lat_bias = BIAS_FRACTION * range(&lats);
    let lng_bias = BIAS_FRACTION * range(&lngs);

    [
        ("geometric center", center),
        ("median center", GeoPoint::new(median(&lats), median(&lngs))),
        ("north bias", center.offset(lat_bias, 0.0)),
        ("south bias", center.offset(-lat_bias, 0.0)),
        ("east bias", center.offset(0.0, lng_bias)),
        ("west bias", center.offset(0.0, -lng_bias)),
    ]
}

/// Phase 1: evaluate the starting points and keep the lowest score.
///
/// Ties go to the earlier candidate.
pub fn find_best_start<O: TravelTimeOracle>(
    people: &[Person],
    ctx: &mut RunContext<O>,
) -> Evaluation {
    let [(first_label, first), rest @ ..] = starting_candidates(people);
    info!("Testing {} strategic starting points", rest.len() + 1);

    let mut best = evaluate(first, people, ctx);
    log_start(1, first_label, &best);
    for (i, (label, point)) in rest.into_iter().enumerate() {
        let eval = evaluate(point, people, ctx);
        log_start(i + 2, label, &eval);
        if eval.metrics.score < best.metrics.score {
            best = eval;
        }
    }

    info!(
        "Best starting point: ({:.5}, {:.5})",
        best.point.lat, best.point.lng
    );
    best
}

fn log_start(index: usize, label: &str, eval: &Evaluation) {
    debug!(
        "Point {} ({}): Std={:.1}min, Max={:.0}min, Score={:.0}",
        index, label, eval.metrics.std, eval.metrics.max, eval.metrics.score
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubOracle;
    use rstest::{fixture, rstest};

    #[fixture]
    fn group() -> Vec<Person> {
        vec![
            Person::new("a", 0.0, 0.0),
            Person::new("b", 1.0, 2.0),
            Person::new("c", 4.0, 10.0),
        ]
    }

    fn close(a: GeoPoint, lat: f64, lng: f64) -> bool {
        (a.lat - lat).abs() < 1e-12 && (a.lng - lng).abs() < 1e-12
    }

    #[rstest]
    fn candidates_in_fixed_order(group: Vec<Person>) {
        let c = starting_candidates(&group);
        let labels: Vec<&str> = c.iter().map(|(l, _)| *l).collect();
        assert_eq!(
            labels,
            vec![
                "geometric center",
                "median center",
                "north bias",
                "south bias",
                "east bias",
                "west bias"
            ]
        );
        // mean (5/3, 4), median (1, 2), lat range 4, lng range 10
        assert!(close(c[0].1, 5.0 / 3.0, 4.0));
        assert!(close(c[1].1, 1.0, 2.0));
        assert!(close(c[2].1, 5.0 / 3.0 + 0.8, 4.0));
        assert!(close(c[3].1, 5.0 / 3.0 - 0.8, 4.0));
        assert!(close(c[4].1, 5.0 / 3.0, 6.0));
        assert!(close(c[5].1, 5.0 / 3.0, 2.0));
    }

    #[rstest]
    fn ties_keep_the_geometric_center(group: Vec<Person>) {
        let oracle = StubOracle::constant("10 minutes");
        let mut ctx = RunContext::new(&oracle, 45);
        let best = find_best_start(&group, &mut ctx);
        assert_eq!(best.point, starting_candidates(&group)[0].1);
        assert_eq!(ctx.calls_used(), 18);
    }

    #[rstest]
    fn picks_the_lowest_score() {
        // Two people on a line; the mean is equidistant, biased points are not.
        let people = vec![Person::new("a", 0.0, 0.0), Person::new("b", 0.0, 0.2)];
        let oracle = StubOracle::by_distance(0.0, 100.0);
        let mut ctx = RunContext::new(&oracle, 45);
        let best = find_best_start(&people, &mut ctx);
        assert!(close(best.point, 0.0, 0.1));
        assert_eq!(best.metrics.std, 0.0);
    }
}
