use itertools::Itertools;
use itertools::MinMaxResult;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median; an even count averages the two middle values.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sorted: Vec<f64> = values.iter().copied().sorted_by(|a, b| a.total_cmp(b)).collect();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Population standard deviation (divides by n).
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let avg = mean(values);
    let variance =
        values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// `(min, max)` of a slice, `(0, 0)` when empty.
pub fn min_max(values: &[f64]) -> (f64, f64) {
    match values.iter().copied().minmax_by(|a, b| a.total_cmp(b)) {
        MinMaxResult::NoElements => (0.0, 0.0),
        MinMaxResult::OneElement(v) => (v, v),
        MinMaxResult::MinMax(lo, hi) => (lo, hi),
    }
}

pub fn range(values: &[f64]) -> f64 {
    let (lo, hi) = min_max(values);
    hi - lo
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
