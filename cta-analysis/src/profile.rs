//! Seasonal baselines: long-run per-(city, season) temperature statistics.

use crate::stats;
use cta_owm::season::Season;
use cta_owm::series::{CitySeries, CitySeriesSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// All seasonal profiles of one analysis run, keyed by (city, season).
pub type SeasonalProfileSet = BTreeMap<(String, Season), SeasonalProfile>;

/// Typical temperature for one city in one season, pooled across every
/// year of the series. Samples from 2019's winter and 2023's winter land
/// in the same bucket; the profile describes "winter in this city", not
/// a per-year trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalProfile {
    pub city: String,
    pub season: Season,
    pub mean: f64,
    /// Sample standard deviation; 0 when only one sample exists.
    pub std: f64,
    pub sample_count: usize,
    pub min: f64,
    pub max: f64,
}

/// Lookup helper for the profile set.
pub trait ProfileLookup {
    fn profile_for(&self, city: &str, season: Season) -> Option<&SeasonalProfile>;
}

impl ProfileLookup for SeasonalProfileSet {
    fn profile_for(&self, city: &str, season: Season) -> Option<&SeasonalProfile> {
        self.get(&(city.to_string(), season))
    }
}

/// Compute the profile of every season present in the series.
///
/// An empty series yields an empty result, not an error. The output is a
/// pure function of the input: same series, same profiles.
pub fn profile_city(series: &CitySeries) -> Vec<SeasonalProfile> {
    let mut by_season: BTreeMap<Season, Vec<f64>> = BTreeMap::new();
    for obs in &series.observations {
        by_season.entry(obs.season).or_default().push(obs.temperature);
    }

    by_season
        .into_iter()
        .map(|(season, temps)| {
            let mean = stats::mean(&temps).expect("season bucket is never empty");
            let std = stats::sample_std(&temps);
            let min = temps.iter().copied().fold(f64::INFINITY, f64::min);
            let max = temps.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            SeasonalProfile {
                city: series.city.clone(),
                season,
                mean,
                std,
                sample_count: temps.len(),
                min,
                max,
            }
        })
        .collect()
}

/// Profile every city in the set.
pub fn profile_all(set: &CitySeriesSet) -> SeasonalProfileSet {
    let mut profiles = SeasonalProfileSet::new();
    for series in set.values() {
        for profile in profile_city(series) {
            profiles.insert((profile.city.clone(), profile.season), profile);
        }
    }
    profiles
}
