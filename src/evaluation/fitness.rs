use crate::config::constant::{MAX_WEIGHT, STD_WEIGHT};
use crate::domain::Metrics;
use crate::utils::{mean, min_max, population_std};

/// std dominates to push for equality; max keeps anyone from being stranded.
pub fn composite_score(std: f64, max: f64) -> f64 {
    std * STD_WEIGHT + max * MAX_WEIGHT
}

/// Reduce per-person minutes to the fairness metrics. Lower score is better.
pub fn find_fitness(minutes: &[f64]) -> Metrics {
    let avg = mean(minutes);
    let std = population_std(minutes);
    let (min, max) = min_max(minutes);
    Metrics {
        avg,
        std,
        max,
        min,
        spread: max - min,
        score: composite_score(std, max),
    }
}
