use crate::config::constant::{MAX_GRID_SIZE, MIN_STEP_DEGREES, STEP_FRACTION};
use crate::domain::Person;
use crate::utils::range;

const GRID_9: [(i32, i32); 9] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1), (0, 0), (0, 1),
    (1, -1), (1, 0), (1, 1),
];

const GRID_12: [(i32, i32); 12] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -2), (0, -1), (0, 0), (0, 1), (0, 2),
    (1, -1), (1, 0), (1, 1),
    (2, 0),
];

const CENTER_ONLY: [(i32, i32); 1] = [(0, 0)];

/// Number of Phase-2 grid cells the remaining budget can pay for.
///
/// One evaluation per person is held back for the final validation. Uses
/// floor division, so an overdrawn budget gives a negative size.
pub fn grid_size(max_calls: usize, used: usize, n_people: usize) -> i64 {
    let n = n_people.max(1) as i64;
    let remaining = max_calls as i64 - used as i64 - n_people as i64;
    remaining.div_euclid(n).min(MAX_GRID_SIZE)
}

/// `(dlat, dlng)` step multiples for a grid size.
///
/// Only 9 and 12 have a shape; anything else evaluates just the center.
pub fn grid_offsets(size: i64) -> &'static [(i32, i32)] {
    match size {
        9 => &GRID_9,
        12 => &GRID_12,
        _ => &CENTER_ONLY,
    }
}

/// Grid step in degrees, proportional to the group's spread with a floor.
pub fn step_sizes(people: &[Person]) -> (f64, f64) {
    let lats: Vec<f64> = people.iter().map(|p| p.lat).collect();
    let lngs: Vec<f64> = people.iter().map(|p| p.lng).collect();
    (
        (range(&lats) * STEP_FRACTION).max(MIN_STEP_DEGREES),
        (range(&lngs) * STEP_FRACTION).max(MIN_STEP_DEGREES),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(45, 12, 2, 12)] // 31 / 2 = 15, capped
    #[case(45, 10, 2, 12)]
    #[case(45, 18, 3, 8)] // 24 / 3
    #[case(45, 15, 3, 9)] // 27 / 3
    #[case(45, 40, 2, 1)]
    #[case(45, 45, 50, -1)] // -50 / 50
    #[case(45, 45, 7, -1)] // -7 / 7
    #[case(45, 44, 4, -1)] // -3 / 4 floors to -1
    fn size_from_remaining_budget(
        #[case] max_calls: usize,
        #[case] used: usize,
        #[case] n: usize,
        #[case] expected: i64,
    ) {
        assert_eq!(grid_size(max_calls, used, n), expected);
    }

    #[rstest]
    fn nine_is_the_full_square() {
        let offsets = grid_offsets(9);
        assert_eq!(offsets.len(), 9);
        for dlat in -1..=1 {
            for dlng in -1..=1 {
                assert!(offsets.contains(&(dlat, dlng)));
            }
        }
        assert_eq!(offsets[0], (-1, -1));
    }

    #[rstest]
    fn twelve_is_the_diamond() {
        let offsets = grid_offsets(12);
        assert_eq!(offsets.len(), 12);
        assert!(offsets.contains(&(0, -2)));
        assert!(offsets.contains(&(0, 2)));
        assert_eq!(offsets[11], (2, 0));
        assert!(!offsets.contains(&(-2, 0)));
    }

    #[rstest]
    #[case(10)]
    #[case(11)]
    #[case(1)]
    #[case(-3)]
    fn other_sizes_fall_back_to_center(#[case] size: i64) {
        assert_eq!(grid_offsets(size), &[(0, 0)]);
    }

    #[rstest]
    fn steps_scale_with_spread() {
        let people = vec![Person::new("a", 0.0, 10.0), Person::new("b", 1.0, 10.02)];
        let (step_lat, step_lng) = step_sizes(&people);
        assert!((step_lat - 0.15).abs() < 1e-12);
        // 0.02 * 0.15 = 0.003, below the floor
        assert_eq!(step_lng, 0.005);
    }

    #[rstest]
    fn colocated_people_get_the_floor() {
        let people = vec![Person::new("a", 5.0, 5.0), Person::new("b", 5.0, 5.0)];
        assert_eq!(step_sizes(&people), (0.005, 0.005));
    }
}
