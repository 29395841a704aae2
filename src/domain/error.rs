use thiserror::Error;

/// Rejected input, reported before any oracle call is made.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("at least one person is required")]
    NoPeople,
    #[error("person {id:?} has a non-finite coordinate ({lat}, {lng})")]
    NonFiniteCoordinate { id: String, lat: f64, lng: f64 },
    #[error("person {id:?} has latitude {lat} outside [-90, 90]")]
    LatitudeOutOfRange { id: String, lat: f64 },
    #[error("person {id:?} has longitude {lng} outside [-180, 180]")]
    LongitudeOutOfRange { id: String, lng: f64 },
    #[error("person id {0:?} appears more than once")]
    DuplicateId(String),
    #[error("call budget must be at least 1")]
    ZeroBudget,
}
