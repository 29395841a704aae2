use std::collections::HashSet;

use crate::domain::error::InputError;
use crate::domain::types::Person;

/// Check the people list and budget before a run starts.
pub fn validate_inputs(people: &[Person], max_api_calls: usize) -> Result<(), InputError> {
    if people.is_empty() {
        return Err(InputError::NoPeople);
    }
    if max_api_calls == 0 {
        return Err(InputError::ZeroBudget);
    }

    let mut seen = HashSet::with_capacity(people.len());
    for person in people {
        if !person.lat.is_finite() || !person.lng.is_finite() {
            return Err(InputError::NonFiniteCoordinate {
                id: person.id.clone(),
                lat: person.lat,
                lng: person.lng,
            });
        }
        if !(-90.0..=90.0).contains(&person.lat) {
            return Err(InputError::LatitudeOutOfRange {
                id: person.id.clone(),
                lat: person.lat,
            });
        }
        if !(-180.0..=180.0).contains(&person.lng) {
            return Err(InputError::LongitudeOutOfRange {
                id: person.id.clone(),
                lng: person.lng,
            });
        }
        if !seen.insert(person.id.as_str()) {
            return Err(InputError::DuplicateId(person.id.clone()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn accepts_a_normal_group() {
        let people = vec![
            Person::new("a", 12.9, 77.6),
            Person::new("b", 13.0, 77.7),
        ];
        assert!(validate_inputs(&people, 45).is_ok());
    }

    #[rstest]
    fn rejects_empty_group() {
        assert_eq!(validate_inputs(&[], 45), Err(InputError::NoPeople));
    }

    #[rstest]
    fn rejects_zero_budget() {
        let people = vec![Person::new("a", 0.0, 0.0)];
        assert_eq!(validate_inputs(&people, 0), Err(InputError::ZeroBudget));
    }

    #[rstest]
    #[case(f64::NAN, 0.0)]
    #[case(0.0, f64::INFINITY)]
    fn rejects_non_finite(#[case] lat: f64, #[case] lng: f64) {
        let people = vec![Person::new("a", lat, lng)];
        assert!(matches!(
            validate_inputs(&people, 45),
            Err(InputError::NonFiniteCoordinate { .. })
        ));
    }

    #[rstest]
    fn rejects_out_of_range_latitude() {
        let people = vec![Person::new("a", 91.0, 0.0)];
        assert!(matches!(
            validate_inputs(&people, 45),
            Err(InputError::LatitudeOutOfRange { .. })
        ));
    }

    #[rstest]
    fn rejects_out_of_range_longitude() {
        let people = vec![Person::new("a", 0.0, -180.5)];
        assert!(matches!(
            validate_inputs(&people, 45),
            Err(InputError::LongitudeOutOfRange { .. })
        ));
    }

    #[rstest]
    fn rejects_duplicate_ids() {
        let people = vec![Person::new("a", 1.0, 1.0), Person::new("a", 2.0, 2.0)];
        assert_eq!(
            validate_inputs(&people, 45),
            Err(InputError::DuplicateId("a".to_string()))
        );
    }
}
