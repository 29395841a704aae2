pub mod data_generator;

pub use data_generator::{generate_random_group, read_people_from_csv, sample_group};
