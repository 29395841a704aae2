pub mod cache;
pub mod duration;
pub mod oracle;
pub mod providers;

pub use cache::{cache_key, RunContext};
pub use duration::{parse_duration_minutes, parse_duration_seconds, parse_minutes_split};
pub use oracle::{OracleError, RouteDuration, TravelTimeOracle};
