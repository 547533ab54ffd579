use crate::error::Result;
use crate::observation::{parse_history_csv, Observation, RawRecord, RejectReason};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// All per-city series produced by one load, keyed by city name.
pub type CitySeriesSet = BTreeMap<String, CitySeries>;

/// An ordered daily temperature series for one city.
///
/// Observations are sorted ascending by date and dates are unique;
/// `load_series` is the only constructor that matters and it enforces
/// both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySeries {
    pub city: String,
    pub observations: Vec<Observation>,
}

impl CitySeries {
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Temperatures in date order.
    pub fn temperatures(&self) -> impl Iterator<Item = f64> + '_ {
        self.observations.iter().map(|o| o.temperature)
    }
}

/// What happened to the raw records during one load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadReport {
    /// Records that passed validation (including ones later superseded
    /// by a duplicate).
    pub accepted: usize,
    /// Rejection counts by reason.
    pub rejections: BTreeMap<RejectReason, usize>,
    /// Accepted records discarded because a later record carried the
    /// same (city, date).
    pub duplicates_replaced: usize,
}

impl LoadReport {
    /// Total number of dropped records.
    pub fn rejected(&self) -> usize {
        self.rejections.values().sum()
    }
}

/// Normalize raw records into per-city series.
///
/// Malformed records are counted and dropped, never fatal. Duplicate
/// (city, date) pairs keep the record encountered later in input order.
/// A city with a single valid observation still yields a series.
pub fn load_series(
    records: impl IntoIterator<Item = RawRecord>,
    temperature_bounds: (f64, f64),
) -> (CitySeriesSet, LoadReport) {
    let mut report = LoadReport::default();
    let mut by_city: BTreeMap<String, BTreeMap<chrono::NaiveDate, Observation>> = BTreeMap::new();

    for record in records {
        match record.validate(temperature_bounds) {
            Ok(obs) => {
                report.accepted += 1;
                let dates = by_city.entry(obs.city.clone()).or_default();
                if dates.insert(obs.date, obs).is_some() {
                    report.duplicates_replaced += 1;
                }
            }
            Err(reason) => {
                *report.rejections.entry(reason).or_insert(0) += 1;
            }
        }
    }

    let set = by_city
        .into_iter()
        .map(|(city, dates)| {
            // BTreeMap iteration already yields ascending dates
            let observations = dates.into_values().collect();
            (city.clone(), CitySeries { city, observations })
        })
        .collect();
    (set, report)
}

/// Parse and load a history CSV body in one step.
pub fn load_history_csv(
    body: &str,
    temperature_bounds: (f64, f64),
) -> Result<(CitySeriesSet, LoadReport)> {
    let records = parse_history_csv(body)?;
    Ok(load_series(records, temperature_bounds))
}
