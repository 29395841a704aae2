use std::error::Error;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::config::constant::RANDOM_GROUP_RADIUS_DEGREES;
use crate::domain::{GeoPoint, Person};

/// Column names that mark the first row as a header.
const HEADER_FIELDS: [&str; 3] = ["user_id", "lat", "lng"];

/// Reads `user_id,lat,lng` rows from a CSV file.
///
/// A first row naming the `user_id`, `lat` and `lng` columns is a header and
/// later rows are read by column name; otherwise rows are read by position.
/// Blank rows are skipped.
pub fn read_people_from_csv(csv_path: impl AsRef<Path>) -> Result<Vec<Person>, Box<dyn Error>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(csv_path.as_ref())?;

    let mut headers: Option<StringRecord> = None;
    let mut people = Vec::new();
    for (idx, row) in reader.records().enumerate() {
        let record = row?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        if idx == 0 && is_header(&record) {
            debug!("Reading columns by name: {:?}", record);
            headers = Some(record.iter().map(str::to_ascii_lowercase).collect());
            continue;
        }

        let person: Person = record
            .deserialize(headers.as_ref())
            .map_err(|e| format!("row {}: {}", idx + 1, e))?;
        people.push(person);
    }

    info!(
        "Loaded {} people from {}",
        people.len(),
        csv_path.as_ref().display()
    );
    Ok(people)
}

fn is_header(record: &StringRecord) -> bool {
    HEADER_FIELDS
        .iter()
        .all(|name| record.iter().any(|field| field.eq_ignore_ascii_case(name)))
}

/// Four colleagues spread across Bengaluru.
pub fn sample_group() -> Vec<Person> {
    vec![
        Person::new("Priya", 12.9279, 77.6276),
        Person::new("Rahul", 12.9650, 77.6400),
        Person::new("Sneha", 13.0169, 77.6858),
        Person::new("Vikram", 12.9241, 77.5511),
    ]
}

/// Generates `count` people uniformly inside a square around `center`.
/// The same seed always gives the same group.
pub fn generate_random_group(count: usize, center: GeoPoint, seed: u64) -> Vec<Person> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let r = RANDOM_GROUP_RADIUS_DEGREES;
    let people: Vec<Person> = (0..count)
        .map(|i| {
            let lat = center.lat + rng.gen_range(-r..=r);
            let lng = center.lng + rng.gen_range(-r..=r);
            Person::new(format!("user{}", i + 1), lat, lng)
        })
        .collect();
    info!(
        "Generated {} people around ({:.4}, {:.4}) with seed {}",
        people.len(),
        center.lat,
        center.lng,
        seed
    );
    people
}
