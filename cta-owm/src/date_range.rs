use chrono::{NaiveDate, TimeDelta};
use std::mem::replace;

/// A date range iterator that yields every date from the start date
/// through the end date (inclusive). Used to lay out daily series.
#[derive(Clone, Eq, PartialEq, Copy, Debug)]
pub struct DateRange(pub NaiveDate, pub NaiveDate);

impl Iterator for DateRange {
    type Item = NaiveDate;
    fn next(&mut self) -> Option<Self::Item> {
        if self.0 <= self.1 {
            let next = self.0 + TimeDelta::try_days(1).unwrap();
            Some(replace(&mut self.0, next))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DateRange;
    use chrono::NaiveDate;

    #[test]
    fn test_full_month() {
        let start = NaiveDate::from_ymd_opt(2021, 6, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2021, 6, 30).unwrap();
        let dates: Vec<NaiveDate> = DateRange(start, end).collect();
        assert_eq!(dates.len(), 30);
        assert_eq!(dates[0], start);
        assert_eq!(*dates.last().unwrap(), end);
    }

    #[test]
    fn test_crosses_year_boundary() {
        let start = NaiveDate::from_ymd_opt(2020, 12, 30).unwrap();
        let end = NaiveDate::from_ymd_opt(2021, 1, 2).unwrap();
        let dates: Vec<NaiveDate> = DateRange(start, end).collect();
        assert_eq!(dates.len(), 4);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let start = NaiveDate::from_ymd_opt(2021, 2, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2021, 2, 1).unwrap();
        assert_eq!(DateRange(start, end).count(), 0);
    }
}
