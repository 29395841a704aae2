pub mod error;
pub mod types;
pub mod validation;

pub use error::InputError;
pub use types::*;
pub use validation::validate_inputs;
