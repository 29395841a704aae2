pub mod grid;
pub mod region;
pub mod report;
pub mod search;

pub use grid::{grid_offsets, grid_size, step_sizes};
pub use region::{find_best_start, starting_candidates};
pub use report::{assemble_outcome, geo_spread, max_pair_distance, spread_insight, top_alternatives};
pub use search::{compute_equal_time_location, local_grid_search, run_search, GridSearch};
