//! Checking a freshly observed temperature against the seasonal baseline.

use crate::profile::{ProfileLookup, SeasonalProfileSet};
use crate::stats::ZERO_VARIANCE_EPS;
use cta_owm::season::Season;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Three-valued outcome of a live check.
///
/// `Unknown` means no seasonal baseline exists for the (city, season)
/// pair. It is deliberately distinct from `Normal`: "we cannot tell" and
/// "this is fine" must never be conflated.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Unknown,
    Normal,
    Anomalous,
}

impl Verdict {
    /// `None` when no baseline existed, otherwise whether the reading
    /// was anomalous.
    pub fn is_anomaly(&self) -> Option<bool> {
        match self {
            Verdict::Unknown => None,
            Verdict::Normal => Some(false),
            Verdict::Anomalous => Some(true),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Verdict::Unknown => "no baseline",
            Verdict::Normal => "normal",
            Verdict::Anomalous => "anomalous",
        };
        f.write_str(label)
    }
}

/// Result of comparing one live reading against its seasonal baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveCheckResult {
    pub city: String,
    pub season: Season,
    /// The reading under test, in °C
    pub observed_temperature: f64,
    pub baseline_mean: Option<f64>,
    pub baseline_std: Option<f64>,
    /// (observed − mean) / std; `None` when the baseline is missing or
    /// has zero variance.
    pub deviation_sigma: Option<f64>,
    pub verdict: Verdict,
}

/// Compare an observed temperature against the seasonal baseline for
/// (city, season).
///
/// Mirrors the rolling detector's zero-variance rule: a constant
/// baseline makes any differing reading anomalous. A missing baseline
/// yields `Verdict::Unknown`.
pub fn check(
    city: &str,
    season: Season,
    observed_temperature: f64,
    profiles: &SeasonalProfileSet,
    sigma_threshold: f64,
) -> LiveCheckResult {
    let profile = match profiles.profile_for(city, season) {
        Some(p) => p,
        None => {
            return LiveCheckResult {
                city: city.to_string(),
                season,
                observed_temperature,
                baseline_mean: None,
                baseline_std: None,
                deviation_sigma: None,
                verdict: Verdict::Unknown,
            }
        }
    };

    let (deviation_sigma, anomalous) = if profile.std > ZERO_VARIANCE_EPS {
        let sigma = (observed_temperature - profile.mean) / profile.std;
        (Some(sigma), sigma.abs() > sigma_threshold)
    } else {
        (
            None,
            (observed_temperature - profile.mean).abs() > ZERO_VARIANCE_EPS,
        )
    };

    LiveCheckResult {
        city: city.to_string(),
        season,
        observed_temperature,
        baseline_mean: Some(profile.mean),
        baseline_std: Some(profile.std),
        deviation_sigma,
        verdict: if anomalous {
            Verdict::Anomalous
        } else {
            Verdict::Normal
        },
    }
}
