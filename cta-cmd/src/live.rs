//! Live-weather commands: fetching current conditions and checking them
//! against seasonal baselines.

use anyhow::Context;
use chrono::Local;
use cta_analysis::live;
use cta_analysis::profile::profile_all;
use cta_owm::client::OwmClient;
use cta_owm::observation::DEFAULT_TEMPERATURE_BOUNDS;
use cta_owm::season::Season;
use cta_owm::series::load_history_csv;
use cta_utils::dates::parse_date;
use log::{info, warn};

/// Check the current temperature of each requested city against that
/// city's baseline for the season containing `as_of`.
///
/// Cities whose fetch fails are skipped, not fatal; cities without a
/// baseline get an explicit "no baseline" verdict.
pub async fn run_live_check(
    history_csv: &str,
    cities: &[String],
    api_key: Option<String>,
    as_of: Option<&str>,
    sigma: f64,
) -> anyhow::Result<()> {
    let body = std::fs::read_to_string(history_csv)
        .with_context(|| format!("failed to read {history_csv}"))?;
    let (series_set, report) = load_history_csv(&body, DEFAULT_TEMPERATURE_BOUNDS)?;
    if report.rejected() > 0 {
        warn!("{} history records were dropped during load", report.rejected());
    }
    let profiles = profile_all(&series_set);

    let cities: Vec<String> = if cities.is_empty() {
        series_set.keys().cloned().collect()
    } else {
        cities.to_vec()
    };
    let as_of_date = match as_of {
        Some(s) => parse_date(s)?,
        None => Local::now().naive_local().date(),
    };
    let season = Season::for_date(&as_of_date);

    info!(
        "Checking {} cities against their {} baselines",
        cities.len(),
        season
    );
    let client = OwmClient::new(api_key)?;
    let current = client.fetch_current_many(&cities).await;

    for city in &cities {
        let conditions = match current.get(city) {
            Some(c) => c,
            None => {
                info!("{}: no current reading, nothing to check", city);
                continue;
            }
        };
        let (min, max) = DEFAULT_TEMPERATURE_BOUNDS;
        if conditions.temperature < min || conditions.temperature > max {
            warn!(
                "{}: reported {:.1} °C is outside [{}, {}], skipping",
                city, conditions.temperature, min, max
            );
            continue;
        }

        let result = live::check(city, season, conditions.temperature, &profiles, sigma);
        let reading = if conditions.description.is_empty() {
            format!("{:.1} °C", conditions.temperature)
        } else {
            format!("{:.1} °C, {}", conditions.temperature, conditions.description)
        };
        match (result.baseline_mean, result.deviation_sigma) {
            (Some(mean), Some(deviation)) => println!(
                "{}: {} | {} baseline {:.1} ± {:.1} °C: {} ({:+.2}σ)",
                city,
                reading,
                season,
                mean,
                result.baseline_std.unwrap_or(0.0),
                result.verdict,
                deviation
            ),
            (Some(mean), None) => println!(
                "{}: {} | constant {} baseline {:.1} °C: {}",
                city, reading, season, mean, result.verdict
            ),
            (None, _) => println!("{}: {} | {}", city, reading, result.verdict),
        }
    }
    Ok(())
}

/// Fetch current conditions for the given cities and print them.
pub async fn run_fetch(cities: &[String], api_key: Option<String>) -> anyhow::Result<()> {
    let client = OwmClient::new(api_key)?;
    let current = client.fetch_current_many(cities).await;

    for city in cities {
        match current.get(city) {
            Some(conditions) if conditions.description.is_empty() => {
                println!("{}: {:.1} °C", city, conditions.temperature)
            }
            Some(conditions) => println!(
                "{}: {:.1} °C, {}",
                city, conditions.temperature, conditions.description
            ),
            None => println!("{}: unavailable", city),
        }
    }
    info!(
        "Fetched {} of {} requested cities",
        current.len(),
        cities.len()
    );
    Ok(())
}
