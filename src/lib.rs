pub mod cli;
pub mod config;
pub mod distance;
pub mod domain;
pub mod evaluation;
pub mod fixtures;
pub mod solver;
pub mod utils;

#[doc(hidden)]
pub mod test_support;

pub use distance::{RunContext, TravelTimeOracle};
pub use domain::{GeoPoint, InputError, OptimizationOutcome, Person};
pub use solver::two_phase::compute_equal_time_location;
