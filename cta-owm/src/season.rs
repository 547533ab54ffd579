use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A meteorological season.
///
/// The month mapping follows the Northern-hemisphere convention:
/// Dec/Jan/Feb are winter, Mar/Apr/May spring, Jun/Jul/Aug summer,
/// Sep/Oct/Nov autumn. The mapping is fixed so that seasonal baselines
/// stay comparable across every dataset this toolkit touches.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

/// All four seasons in calendar order starting at winter.
pub const ALL_SEASONS: [Season; 4] = [
    Season::Winter,
    Season::Spring,
    Season::Summer,
    Season::Autumn,
];

impl Season {
    /// Season for a calendar month (1-12).
    ///
    /// Panics on months outside 1-12; `chrono` dates cannot produce those.
    pub fn from_month(month: u32) -> Season {
        match month {
            12 | 1 | 2 => Season::Winter,
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => panic!("invalid calendar month: {month}"),
        }
    }

    /// Season containing the given date.
    pub fn for_date(date: &NaiveDate) -> Season {
        Season::from_month(date.month())
    }

    /// Lowercase label, matching the values accepted in CSV input.
    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Winter => "winter",
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Season {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "winter" => Ok(Season::Winter),
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "autumn" | "fall" => Ok(Season::Autumn),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Season;
    use chrono::NaiveDate;

    #[test]
    fn test_month_mapping() {
        assert_eq!(Season::from_month(12), Season::Winter);
        assert_eq!(Season::from_month(1), Season::Winter);
        assert_eq!(Season::from_month(2), Season::Winter);
        assert_eq!(Season::from_month(3), Season::Spring);
        assert_eq!(Season::from_month(5), Season::Spring);
        assert_eq!(Season::from_month(6), Season::Summer);
        assert_eq!(Season::from_month(8), Season::Summer);
        assert_eq!(Season::from_month(9), Season::Autumn);
        assert_eq!(Season::from_month(11), Season::Autumn);
    }

    #[test]
    fn test_for_date() {
        let jan = NaiveDate::from_ymd_opt(2023, 1, 15).unwrap();
        assert_eq!(Season::for_date(&jan), Season::Winter);
        let jul = NaiveDate::from_ymd_opt(2023, 7, 1).unwrap();
        assert_eq!(Season::for_date(&jul), Season::Summer);
    }

    #[test]
    fn test_round_trip_labels() {
        for season in super::ALL_SEASONS {
            let label = season.to_string();
            assert_eq!(label.parse::<Season>().unwrap(), season);
        }
        assert_eq!("Fall".parse::<Season>().unwrap(), Season::Autumn);
        assert!("monsoon".parse::<Season>().is_err());
    }
}
