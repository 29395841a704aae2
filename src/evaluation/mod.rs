pub mod candidate;
pub mod fitness;

pub use candidate::{evaluate, travel_minutes};
pub use fitness::{composite_score, find_fitness};
