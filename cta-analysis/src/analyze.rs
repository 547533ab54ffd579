//! The analysis facade: raw records in, annotated series and verdicts out.

use crate::descriptive::{self, DescriptiveStats, TrendEstimate};
use crate::live::{self, LiveCheckResult};
use crate::profile::{self, ProfileLookup, SeasonalProfileSet};
use crate::rolling::{self, RollingStat};
use crate::stats::ZERO_VARIANCE_EPS;
use chrono::NaiveDate;
use cta_owm::observation::{Observation, RawRecord, DEFAULT_TEMPERATURE_BOUNDS};
use cta_owm::season::Season;
use cta_owm::series::{load_series, LoadReport};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tunables shared by the rolling detector and the live checker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Trailing window length in observations (daily data: days)
    pub window_size: usize,
    /// Sigma multiple beyond which a deviation is anomalous
    pub sigma_threshold: f64,
    /// Accepted physical temperature range in °C, inclusive
    pub temperature_bounds: (f64, f64),
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            window_size: 30,
            sigma_threshold: 2.0,
            temperature_bounds: DEFAULT_TEMPERATURE_BOUNDS,
        }
    }
}

/// One historical observation with both anomaly signals attached.
///
/// The rolling and seasonal verdicts are computed from different
/// baselines and reported separately; neither overrides the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedObservation {
    pub observation: Observation,
    pub rolling: RollingStat,
    /// Deviation beyond the seasonal band for this city and season
    pub is_seasonal_anomaly: bool,
}

/// Descriptive summary for one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySummary {
    pub stats: DescriptiveStats,
    /// Absent when the series spans fewer than two days
    pub trend: Option<TrendEstimate>,
}

/// Everything one analysis run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutput {
    /// Per-city annotated history, ascending by date
    pub annotated: BTreeMap<String, Vec<AnnotatedObservation>>,
    pub profiles: SeasonalProfileSet,
    pub summaries: BTreeMap<String, CitySummary>,
    /// One verdict per city present in the live map
    pub live_results: Vec<LiveCheckResult>,
    pub load_report: LoadReport,
}

/// Run the whole pipeline: normalize records, profile seasons, compute
/// rolling statistics, and check live readings against the season that
/// contains `as_of`.
///
/// Holds no state across calls. Cities whose live reading is outside
/// the configured physical bounds are skipped with a warning, mirroring
/// how a failed fetch simply leaves a city absent from the map.
pub fn analyze(
    records: impl IntoIterator<Item = RawRecord>,
    live_temperatures: &BTreeMap<String, f64>,
    config: &AnalysisConfig,
    as_of: NaiveDate,
) -> AnalysisOutput {
    let (series_set, load_report) = load_series(records, config.temperature_bounds);
    let profiles = profile::profile_all(&series_set);

    let mut annotated = BTreeMap::new();
    let mut summaries = BTreeMap::new();
    for (city, series) in &series_set {
        let rolling_stats = rolling::detect(series, config.window_size, config.sigma_threshold);
        let rows = series
            .observations
            .iter()
            .zip(rolling_stats)
            .map(|(obs, rolling)| AnnotatedObservation {
                is_seasonal_anomaly: seasonal_anomaly(obs, &profiles, config.sigma_threshold),
                observation: obs.clone(),
                rolling,
            })
            .collect();
        annotated.insert(city.clone(), rows);
        if let Some(stats) = descriptive::describe(series) {
            summaries.insert(
                city.clone(),
                CitySummary {
                    stats,
                    trend: descriptive::trend(series),
                },
            );
        }
    }

    let current_season = Season::for_date(&as_of);
    let (min, max) = config.temperature_bounds;
    let live_results = live_temperatures
        .iter()
        .filter(|(city, &temperature)| {
            if temperature < min || temperature > max || !temperature.is_finite() {
                warn!(
                    "Skipping live reading for {}: {} °C is outside [{}, {}]",
                    city, temperature, min, max
                );
                false
            } else {
                true
            }
        })
        .map(|(city, &temperature)| {
            live::check(
                city,
                current_season,
                temperature,
                &profiles,
                config.sigma_threshold,
            )
        })
        .collect();

    AnalysisOutput {
        annotated,
        profiles,
        summaries,
        live_results,
        load_report,
    }
}

/// Is this observation outside its city's seasonal band?
fn seasonal_anomaly(
    obs: &Observation,
    profiles: &SeasonalProfileSet,
    sigma_threshold: f64,
) -> bool {
    match profiles.profile_for(&obs.city, obs.season) {
        Some(profile) if profile.std > ZERO_VARIANCE_EPS => {
            (obs.temperature - profile.mean).abs() > sigma_threshold * profile.std
        }
        // the observation is part of its own seasonal pool, so a
        // zero-variance profile means it equals the mean
        Some(_) => false,
        None => false,
    }
}
