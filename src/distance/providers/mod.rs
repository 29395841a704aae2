pub mod latlong;

pub use latlong::{LatLongConfig, LatLongOracle, ProviderBuildError};
