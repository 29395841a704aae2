use tracing::{info, span, warn, Level};

use crate::config::constant::MIN_GRID_SIZE;
use crate::distance::{RunContext, TravelTimeOracle};
use crate::domain::{validate_inputs, Evaluation, InputError, OptimizationOutcome, Person, PhaseStats};
use crate::evaluation::evaluate;

use super::grid::{grid_offsets, grid_size, step_sizes};
use super::region::find_best_start;
use super::report::{assemble_outcome, geo_spread};

/// Result of the local grid search around the Phase-1 winner.
#[derive(Debug, Clone)]
pub struct GridSearch {
    pub best: Evaluation,
    /// Every evaluated cell, in grid order.
    pub candidates: Vec<Evaluation>,
}

/// Phase 2: evaluate the grid cells for `size` around `start`.
///
/// The running best starts from an infinite score, so the first finite cell
/// replaces `start` even when it ties with it.
pub fn local_grid_search<O: TravelTimeOracle>(
    start: &Evaluation,
    people: &[Person],
    size: i64,
    ctx: &mut RunContext<O>,
) -> GridSearch {
    let (step_lat, step_lng) = step_sizes(people);
    let offsets = grid_offsets(size);
    info!(
        "Dense {}-point local search, radius {:.4} deg lat, {:.4} deg lng",
        offsets.len(),
        step_lat,
        step_lng
    );

    let mut best = start.clone();
    let mut best_score = f64::INFINITY;
    let mut candidates = Vec::with_capacity(offsets.len());

    for (i, &(dlat, dlng)) in offsets.iter().enumerate() {
        let point = start
            .point
            .offset(f64::from(dlat) * step_lat, f64::from(dlng) * step_lng);
        let eval = evaluate(point, people, ctx);
        info!(
            "{:2}/{}: Std={:.1}min, Range={:.0}-{:.0}min, Score={:.0}",
            i + 1,
            offsets.len(),
            eval.metrics.std,
            eval.metrics.min,
            eval.metrics.max,
            eval.metrics.score
        );
        if eval.metrics.score < best_score {
            best_score = eval.metrics.score;
            best = eval.clone();
            info!("New best at cell {:?}", (dlat, dlng));
        }
        candidates.push(eval);
    }

    GridSearch { best, candidates }
}

/// Find the fairest meeting point for `people` with at most `max_api_calls`
/// oracle calls.
///
/// A fresh [`RunContext`] is created for the run, so concurrent calls never
/// share a budget.
pub fn compute_equal_time_location<O: TravelTimeOracle>(
    people: &[Person],
    oracle: O,
    max_api_calls: usize,
) -> Result<OptimizationOutcome, InputError> {
    validate_inputs(people, max_api_calls)?;
    let mut ctx = RunContext::new(oracle, max_api_calls);
    Ok(run_search(people, &mut ctx))
}

/// Both phases plus final validation against an existing context.
///
/// Callers must validate `people` first; an empty slice is not meaningful.
pub fn run_search<O: TravelTimeOracle>(
    people: &[Person],
    ctx: &mut RunContext<O>,
) -> OptimizationOutcome {
    let n_users = people.len();
    let spread = geo_spread(people);
    info!(
        "Users: {} | Max API calls: {} | Spread: {:.4} deg lat x {:.4} deg lng (~{:.1}km x {:.1}km)",
        n_users,
        ctx.max_calls(),
        spread.lat_range,
        spread.lng_range,
        spread.lat_km,
        spread.lng_km
    );

    let mut phases = PhaseStats::default();

    let best_start = {
        let span = span!(Level::INFO, "phase1");
        let _guard = span.enter();
        find_best_start(people, ctx)
    };
    phases.phase1_calls = ctx.calls_used();
    let initial_misses = ctx.misses();
    info!("API calls used: {}/{}", phases.phase1_calls, ctx.max_calls());

    phases.grid_size = grid_size(ctx.max_calls(), initial_misses, n_users);
    let mut phase2_candidates = Vec::new();

    let best = if phases.grid_size >= MIN_GRID_SIZE {
        let span = span!(Level::INFO, "phase2", grid_size = phases.grid_size);
        let _guard = span.enter();
        phases.phase2_ran = true;
        let grid = local_grid_search(&best_start, people, phases.grid_size, ctx);
        info!(
            "Best point found: ({:.6}, {:.6}), std {:.2} minutes",
            grid.best.point.lat, grid.best.point.lng, grid.best.metrics.std
        );
        phase2_candidates = grid.candidates;
        grid.best
    } else {
        warn!(
            "Limited API budget (grid size {}), using best starting point",
            phases.grid_size
        );
        best_start
    };
    phases.phase2_calls = ctx.calls_used() - phases.phase1_calls;

    let final_eval = {
        let span = span!(Level::INFO, "final_validation");
        let _guard = span.enter();
        evaluate(best.point, people, ctx)
    };
    phases.validation_calls = ctx.calls_used() - phases.phase1_calls - phases.phase2_calls;
    phases.oracle_failures = ctx.failures();
    phases.format_mismatches = ctx.format_mismatches();
    phases.budget_exhausted = ctx.budget_exhausted();
    if phases.budget_exhausted {
        warn!(
            "Call budget spent ({} lookups for {} calls)",
            ctx.misses(),
            ctx.max_calls()
        );
    }

    let outcome = assemble_outcome(
        people,
        &final_eval,
        &phase2_candidates,
        ctx.calls_used(),
        phases,
    );

    info!(
        "Optimization complete: ({:.6}, {:.6}) with {} API calls",
        outcome.equal_point.lat, outcome.equal_point.lng, outcome.n_api_calls
    );
    info!(
        "Oracle failures: {}, cached routes: {}",
        ctx.failures(),
        ctx.cached_entries()
    );
    info!(
        "Std {:.2} min, spread {:.1} min ({:.0}-{:.0}), average {:.1} min",
        outcome.equality_score,
        outcome.time_spread,
        outcome.min_time_min,
        outcome.max_time_min,
        outcome.avg_time_min
    );
    if let Some(insight) = &outcome.insight {
        info!(
            "High inequality ({:.1} min) suggests the group is spread out (max distance {:.3} deg); this may be the best achievable balance",
            insight.equality_score, insight.max_pair_distance
        );
    }

    outcome
}
