use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Parser;
use colored::*;
use csv::Writer;
use tracing::{info, span, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::constant::RANDOM_GROUP_SEED;
use crate::config::Settings;
use crate::distance::providers::{LatLongConfig, LatLongOracle};
use crate::domain::{GeoPoint, OptimizationOutcome, Person};
use crate::fixtures::{generate_random_group, read_people_from_csv, sample_group};
use crate::solver::two_phase::compute_equal_time_location;

/// Centre of the synthetic groups made by `--random`.
const RANDOM_GROUP_CENTER: GeoPoint = GeoPoint {
    lat: 12.9716,
    lng: 77.5946,
};

#[derive(Debug, Parser)]
#[command(
    name = "fairpoint",
    about = "Find a meeting point with balanced travel times for a group"
)]
pub struct Cli {
    /// CSV file with `user_id,lat,lng` rows
    #[arg(value_name = "path", required_unless_present_any = ["demo", "random"])]
    pub people: Option<PathBuf>,
    /// Use the built-in sample group
    #[arg(long, conflicts_with_all = ["people", "random"])]
    pub demo: bool,
    /// Generate a random group of this size
    #[arg(long, value_name = "count", conflicts_with = "people")]
    pub random: Option<usize>,
    /// Seed for `--random`
    #[arg(long, default_value_t = RANDOM_GROUP_SEED)]
    pub seed: u64,
    /// Override the oracle call budget (defaults to MAX_API_CALLS)
    #[arg(long, value_name = "n")]
    pub max_calls: Option<usize>,
    /// Write per-person times and alternatives to this CSV file
    #[arg(short, long, value_name = "path")]
    pub output: Option<PathBuf>,
    /// Print the full outcome as JSON instead of the summary
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    pub fn load_people(&self) -> Result<Vec<Person>, Box<dyn Error>> {
        if self.demo {
            info!("Using the built-in sample group");
            return Ok(sample_group());
        }
        if let Some(count) = self.random {
            return Ok(generate_random_group(count, RANDOM_GROUP_CENTER, self.seed));
        }
        match &self.people {
            Some(path) => read_people_from_csv(path),
            None => Err("no people source given (pass a CSV path, --demo or --random)".into()),
        }
    }
}

/// Initialize tracing and environment
fn init_tracing_and_env() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_span_events(fmt::format::FmtSpan::CLOSE))
        .try_init()?;

    dotenv::dotenv().ok();
    Ok(())
}

pub fn run() -> Result<(), Box<dyn Error>> {
    init_tracing_and_env()?;
    let cli = Cli::parse();

    let settings = Settings::from_env()?;
    let max_calls = cli.max_calls.unwrap_or(settings.max_api_calls);
    let people = cli.load_people()?;

    let oracle = {
        let span = span!(Level::INFO, "setup");
        let _guard = span.enter();
        LatLongOracle::new(LatLongConfig::from(&settings))?
    };

    let outcome = compute_equal_time_location(&people, oracle, max_calls)?;
    if cli.json {
        println!("{}", outcome_json(&outcome)?);
    } else {
        print_summary(&outcome, max_calls);
    }

    if let Some(path) = &cli.output {
        save_to_csv(&outcome, path)?;
        info!("Report written to {}", path.display());
    }
    Ok(())
}

fn print_summary(outcome: &OptimizationOutcome, max_calls: usize) {
    println!(
        "{}",
        format!(
            "Meeting point: ({:.6}, {:.6})",
            outcome.equal_point.lat, outcome.equal_point.lng
        )
        .bold()
    );

    let balance = format!(
        "Std {:.2} min | Range {:.0}-{:.0} min | Avg {:.1} min",
        outcome.equality_score, outcome.min_time_min, outcome.max_time_min, outcome.avg_time_min
    );
    if outcome.insight.is_some() {
        println!("{}", balance.red());
    } else {
        println!("{}", balance.green());
    }

    for row in &outcome.user_times {
        println!(
            "  {:<12} {:>6.1} min  ({:+.1})",
            row.user_id, row.travel_time_min, row.deviation_min
        );
    }

    println!(
        "API calls: {}/{} (phase 1: {}, phase 2: {}, validation: {})",
        outcome.n_api_calls,
        max_calls,
        outcome.phases.phase1_calls,
        outcome.phases.phase2_calls,
        outcome.phases.validation_calls
    );

    if outcome.phases.oracle_failures > 0 {
        println!(
            "{}",
            format!(
                "{} route lookups failed and were scored as 15 min",
                outcome.phases.oracle_failures
            )
            .yellow()
        );
    }
    if !outcome.phases.phase2_ran {
        println!("{}", "Budget too small for a grid search".yellow());
    }
    for (i, alt) in outcome.alternative_spots.iter().enumerate() {
        println!(
            "  alt {}: ({:.6}, {:.6}) score {:.0}, std {:.1} min",
            i + 1,
            alt.lat,
            alt.lng,
            alt.score,
            alt.equality_score
        );
    }

    if let Some(insight) = &outcome.insight {
        warn!(
            "Group is widely spread (max distance {:.3} deg); std {:.1} min may be the best achievable",
            insight.max_pair_distance, insight.equality_score
        );
    }
}

pub fn outcome_json(outcome: &OptimizationOutcome) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(outcome)
}

/// Two sections: per-person times, then the alternative spots.
pub fn save_to_csv(outcome: &OptimizationOutcome, path: &Path) -> Result<(), Box<dyn Error>> {
    let mut wtr = Writer::from_path(path)?;

    wtr.write_record(["kind", "id", "lat", "lng", "travel_time_min", "deviation_min", "score"])?;
    for row in &outcome.user_times {
        wtr.write_record([
            "person".to_string(),
            row.user_id.clone(),
            row.lat.to_string(),
            row.lng.to_string(),
            row.travel_time_min.to_string(),
            row.deviation_min.to_string(),
            String::new(),
        ])?;
    }

    wtr.write_record([
        "meeting_point".to_string(),
        String::new(),
        outcome.equal_point.lat.to_string(),
        outcome.equal_point.lng.to_string(),
        outcome.avg_time_min.to_string(),
        String::new(),
        outcome.score.to_string(),
    ])?;

    for (i, alt) in outcome.alternative_spots.iter().enumerate() {
        wtr.write_record([
            "alternative".to_string(),
            (i + 1).to_string(),
            alt.lat.to_string(),
            alt.lng.to_string(),
            alt.avg_time.to_string(),
            String::new(),
            alt.score.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubOracle;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    fn demo_flag_loads_sample_group() {
        let cli = Cli::try_parse_from(["fairpoint", "--demo"]).unwrap();
        assert_eq!(cli.load_people().unwrap(), sample_group());
    }

    #[rstest]
    fn random_flag_is_seeded() {
        let cli = Cli::try_parse_from(["fairpoint", "--random", "6", "--seed", "3"]).unwrap();
        let a = cli.load_people().unwrap();
        let b = cli.load_people().unwrap();
        assert_eq!(a.len(), 6);
        assert_eq!(a, b);
    }

    #[rstest]
    #[case(&["fairpoint"])]
    #[case(&["fairpoint", "people.csv", "--demo"])]
    fn rejects_missing_or_conflicting_sources(#[case] args: &[&str]) {
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[rstest]
    fn path_and_options_parse() {
        let cli =
            Cli::try_parse_from(["fairpoint", "team.csv", "--max-calls", "30", "-o", "out.csv"])
                .unwrap();
        assert_eq!(cli.people, Some(PathBuf::from("team.csv")));
        assert_eq!(cli.max_calls, Some(30));
        assert_eq!(cli.output, Some(PathBuf::from("out.csv")));
    }

    #[rstest]
    fn outcome_serializes_to_json() {
        let people = vec![Person::new("a", 0.0, 0.0), Person::new("b", 0.0, 0.2)];
        let oracle = StubOracle::constant("10 minutes");
        let outcome = compute_equal_time_location(&people, &oracle, 45).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&outcome_json(&outcome).unwrap()).unwrap();
        assert_eq!(value["n_api_calls"], outcome.n_api_calls);
        assert_eq!(value["user_times"][1]["user_id"], "b");
        assert!(value["equal_point"]["lat"].is_number());
        assert_eq!(value["alternative_spots"].as_array().unwrap().len(), 5);
        assert_eq!(value["phases"]["grid_size"], 12);
        assert!(value["insight"].is_null());
    }

    #[rstest]
    fn json_flag_parses() {
        let cli = Cli::try_parse_from(["fairpoint", "--demo", "--json"]).unwrap();
        assert!(cli.json);
    }

    #[rstest]
    fn report_has_people_point_and_alternatives() {
        let people = vec![Person::new("a", 0.0, 0.0), Person::new("b", 0.0, 0.2)];
        let oracle = StubOracle::constant("10 minutes");
        let outcome = compute_equal_time_location(&people, &oracle, 45).unwrap();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.csv");
        save_to_csv(&outcome, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        // header + 2 people + meeting point + 5 alternatives
        assert_eq!(lines.len(), 9);
        assert!(lines[1].starts_with("person,a,"));
        assert!(lines[3].starts_with("meeting_point,"));
        assert!(lines[4].starts_with("alternative,1,"));
    }
}
