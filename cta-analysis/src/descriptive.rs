//! Per-city descriptive statistics and the long-term temperature trend.

use crate::stats;
use cta_owm::series::CitySeries;
use serde::{Deserialize, Serialize};

const DAYS_PER_YEAR: f64 = 365.25;

/// Summary statistics over a whole city series, all seasons pooled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// Least-squares linear trend of temperature over time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendEstimate {
    /// Slope in °C per year
    pub slope_per_year: f64,
    /// Fitted change over the whole observed span, in °C
    pub total_change: f64,
    /// Observed span in years
    pub span_years: f64,
}

/// Describe a series. `None` for an empty series.
pub fn describe(series: &CitySeries) -> Option<DescriptiveStats> {
    let temps: Vec<f64> = series.temperatures().collect();
    let mean = stats::mean(&temps)?;
    let median = stats::median(&temps)?;
    Some(DescriptiveStats {
        count: temps.len(),
        mean,
        median,
        std: stats::sample_std(&temps),
        min: temps.iter().copied().fold(f64::INFINITY, f64::min),
        max: temps.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    })
}

/// Fit the long-term trend of a series.
///
/// `None` when the series spans fewer than two distinct days; a trend
/// over a single point is meaningless.
pub fn trend(series: &CitySeries) -> Option<TrendEstimate> {
    let first = series.observations.first()?.date;
    let xs: Vec<f64> = series
        .observations
        .iter()
        .map(|o| (o.date - first).num_days() as f64)
        .collect();
    let ys: Vec<f64> = series.temperatures().collect();
    let (slope_per_day, _) = stats::least_squares(&xs, &ys)?;
    let span_days = *xs.last()?;
    Some(TrendEstimate {
        slope_per_year: slope_per_day * DAYS_PER_YEAR,
        total_change: slope_per_day * span_days,
        span_years: span_days / DAYS_PER_YEAR,
    })
}
