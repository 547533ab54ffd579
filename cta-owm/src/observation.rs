use crate::error::{OwmError, Result};
use crate::season::Season;
use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::Hash;

/// Date format used for history CSV timestamps: "YYYY-MM-DD"
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Physically plausible surface temperature range in °C. Records outside
/// this range are treated as sensor or entry errors and rejected.
pub const DEFAULT_TEMPERATURE_BOUNDS: (f64, f64) = (-90.0, 60.0);

/// Why a raw record was dropped during loading.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RejectReason {
    MissingCity,
    BadTimestamp,
    BadTemperature,
    TemperatureOutOfRange,
}

/// A single validated temperature sample for one city on one day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub city: String,
    pub date: NaiveDate,
    /// Temperature in °C
    pub temperature: f64,
    pub season: Season,
}

/// One row of history input before validation. Fields that were absent
/// or unparseable arrive as `None`; validation turns each record into an
/// `Observation` or a `RejectReason`.
#[derive(Debug, Clone, Default)]
pub struct RawRecord {
    pub city: Option<String>,
    pub date: Option<NaiveDate>,
    pub temperature: Option<f64>,
    pub season: Option<Season>,
}

impl RawRecord {
    /// Validate this record against the configured temperature bounds.
    ///
    /// A missing season is not an error: it is derived from the
    /// timestamp's calendar month.
    pub fn validate(self, bounds: (f64, f64)) -> std::result::Result<Observation, RejectReason> {
        let city = match self.city {
            Some(c) if !c.trim().is_empty() => c.trim().to_string(),
            _ => return Err(RejectReason::MissingCity),
        };
        let date = self.date.ok_or(RejectReason::BadTimestamp)?;
        let temperature = self.temperature.ok_or(RejectReason::BadTemperature)?;
        if !temperature.is_finite() {
            return Err(RejectReason::BadTemperature);
        }
        let (min, max) = bounds;
        if temperature < min || temperature > max {
            return Err(RejectReason::TemperatureOutOfRange);
        }
        let season = self.season.unwrap_or_else(|| Season::for_date(&date));
        Ok(Observation {
            city,
            date,
            temperature,
            season,
        })
    }
}

/// Parse a history CSV body into raw records.
///
/// The header must carry `city`, `timestamp`, and `temperature` columns;
/// a `season` column is optional. Columns are resolved by name so their
/// order does not matter. Individual cells that fail to parse leave the
/// corresponding field `None`; per-record policy belongs to validation,
/// not parsing. An unrecognized season label is ignored (the season is
/// then derived from the timestamp).
pub fn parse_history_csv(body: &str) -> Result<Vec<RawRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers = rdr.headers()?.clone();
    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    };
    let city_idx = position("city").ok_or(OwmError::MissingColumn("city"))?;
    let date_idx = position("timestamp").ok_or(OwmError::MissingColumn("timestamp"))?;
    let temp_idx = position("temperature").ok_or(OwmError::MissingColumn("temperature"))?;
    let season_idx = position("season");

    let mut records = Vec::new();
    for row in rdr.records() {
        let row = match row {
            Ok(r) => r,
            // an unreadable line is an empty raw record; it will be
            // rejected with a reason during validation
            Err(_) => {
                records.push(RawRecord::default());
                continue;
            }
        };
        let cell = |idx: usize| row.get(idx).map(str::trim).filter(|s| !s.is_empty());
        records.push(RawRecord {
            city: cell(city_idx).map(String::from),
            date: cell(date_idx)
                .and_then(|s| NaiveDate::parse_from_str(s, ISO_DATE_FORMAT).ok()),
            temperature: cell(temp_idx).and_then(|s| s.parse::<f64>().ok()),
            season: season_idx
                .and_then(cell)
                .and_then(|s| s.parse::<Season>().ok()),
        });
    }
    Ok(records)
}

impl Hash for Observation {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.city.hash(state);
        self.date.hash(state);
        self.season.hash(state);
    }
}

impl Ord for Observation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.date.cmp(&other.date)
    }
}

impl Eq for Observation {}

impl PartialEq for Observation {
    fn eq(&self, other: &Self) -> bool {
        self.date == other.date && self.city == other.city
    }
}

impl PartialOrd for Observation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_history_csv, RawRecord, RejectReason, DEFAULT_TEMPERATURE_BOUNDS};
    use crate::season::Season;
    use chrono::NaiveDate;

    const STR_HISTORY: &str = r#"city,timestamp,temperature,season
Berlin,2021-01-05,-2.5,winter
Berlin,2021-07-12,24.1,
Madrid,2021-07-12,33.0,summer
Madrid,not-a-date,20.0,summer
,2021-07-13,21.0,summer
Oslo,2021-02-01,nope,winter
"#;

    #[test]
    fn test_parse_history_csv() {
        let records = parse_history_csv(STR_HISTORY).unwrap();
        assert_eq!(records.len(), 6);
        assert_eq!(records[0].city.as_deref(), Some("Berlin"));
        assert_eq!(records[0].season, Some(Season::Winter));
        // blank season cell
        assert_eq!(records[1].season, None);
        // unparseable date and temperature arrive as None
        assert_eq!(records[3].date, None);
        assert_eq!(records[5].temperature, None);
    }

    #[test]
    fn test_parse_resolves_columns_by_header() {
        let shuffled = "temperature,city,timestamp\n12.5,Lyon,2022-03-04\n";
        let records = parse_history_csv(shuffled).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].city.as_deref(), Some("Lyon"));
        assert_eq!(records[0].temperature, Some(12.5));
    }

    #[test]
    fn test_parse_rejects_missing_column() {
        let no_temp = "city,timestamp\nLyon,2022-03-04\n";
        assert!(parse_history_csv(no_temp).is_err());
    }

    #[test]
    fn test_validate_derives_season() {
        let record = RawRecord {
            city: Some("Berlin".to_string()),
            date: NaiveDate::from_ymd_opt(2021, 7, 12),
            temperature: Some(24.1),
            season: None,
        };
        let obs = record.validate(DEFAULT_TEMPERATURE_BOUNDS).unwrap();
        assert_eq!(obs.season, Season::Summer);
    }

    #[test]
    fn test_validate_reject_reasons() {
        let base = RawRecord {
            city: Some("Berlin".to_string()),
            date: NaiveDate::from_ymd_opt(2021, 7, 12),
            temperature: Some(24.1),
            season: None,
        };

        let mut record = base.clone();
        record.city = Some("   ".to_string());
        assert_eq!(
            record.validate(DEFAULT_TEMPERATURE_BOUNDS),
            Err(RejectReason::MissingCity)
        );

        let mut record = base.clone();
        record.date = None;
        assert_eq!(
            record.validate(DEFAULT_TEMPERATURE_BOUNDS),
            Err(RejectReason::BadTimestamp)
        );

        let mut record = base.clone();
        record.temperature = Some(f64::NAN);
        assert_eq!(
            record.validate(DEFAULT_TEMPERATURE_BOUNDS),
            Err(RejectReason::BadTemperature)
        );

        let mut record = base;
        record.temperature = Some(72.0);
        assert_eq!(
            record.validate(DEFAULT_TEMPERATURE_BOUNDS),
            Err(RejectReason::TemperatureOutOfRange)
        );
    }
}
