use std::sync::OnceLock;

use regex::Regex;

fn hours_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)\s*hour").expect("hour regex is valid"))
}

fn minutes_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)\s*(?:min|minutes?)").expect("minute regex is valid"))
}

fn first_number(re: &Regex, text: &str) -> u64 {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .unwrap_or(0)
}

/// Total minutes in a provider duration such as `"1 hour, 10 minutes"`.
///
/// Missing or unreadable parts count as zero; this never fails.
pub fn parse_duration_minutes(text: &str) -> u64 {
    let cleaned = text.to_lowercase().replace(',', "");
    let hours = first_number(hours_re(), &cleaned);
    let minutes = first_number(minutes_re(), &cleaned);
    hours.saturating_mul(60).saturating_add(minutes)
}

pub fn parse_duration_seconds(text: &str) -> u64 {
    parse_duration_minutes(text).saturating_mul(60)
}

/// Comma-split reading of the provider's own format.
///
/// Each comma-separated part may hold `"<n> hour(s)"` or `"<n> minute(s)"`.
/// Any part that is not a clean number before the unit makes the whole text
/// read as zero.
pub fn parse_minutes_split(text: &str) -> u64 {
    let mut minutes: u64 = 0;
    for part in text.split(',') {
        if let Some((count, _)) = part.split_once("hour") {
            match count.trim().parse::<u64>() {
                Ok(h) => minutes = minutes.saturating_add(h.saturating_mul(60)),
                Err(_) => return 0,
            }
        }
        if let Some((count, _)) = part.split_once("minute") {
            match count.trim().parse::<u64>() {
                Ok(m) => minutes = minutes.saturating_add(m),
                Err(_) => return 0,
            }
        }
    }
    minutes
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1 hour, 10 minutes", 70)]
    #[case("25 mins", 25)]
    #[case("1 hour 15 mins", 75)]
    #[case("2 Hours", 120)]
    #[case("45min", 45)]
    #[case("1 minute", 1)]
    #[case("", 0)]
    #[case("a while", 0)]
    #[case("hour minutes", 0)]
    fn regex_parser(#[case] text: &str, #[case] expected: u64) {
        assert_eq!(parse_duration_minutes(text), expected);
    }

    #[rstest]
    fn seconds_are_minutes_times_sixty() {
        assert_eq!(parse_duration_seconds("1 hour, 10 minutes"), 4200);
        assert_eq!(parse_duration_seconds(""), 0);
    }

    #[rstest]
    fn commas_inside_numbers_are_dropped() {
        // "1,200 mins" reads as 1200 once commas are stripped
        assert_eq!(parse_duration_minutes("1,200 mins"), 1200);
    }

    #[rstest]
    #[case("1 hour, 10 minutes", 70)]
    #[case("10 minutes", 10)]
    #[case("3 hours", 180)]
    #[case("", 0)]
    #[case("about 10 minutes", 0)]
    fn split_parser(#[case] text: &str, #[case] expected: u64) {
        assert_eq!(parse_minutes_split(text), expected);
    }
}
