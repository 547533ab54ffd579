//! Trailing-window statistics and rolling anomaly detection.

use crate::stats::ZERO_VARIANCE_EPS;
use cta_owm::series::CitySeries;
use serde::{Deserialize, Serialize};

/// Rolling statistics for a single observation.
///
/// `rolling_mean`/`rolling_std` describe the trailing window of up to
/// `window_size` observations ending at and including the observation
/// itself; `window_size_used` is that window's actual length (shorter at
/// the start of a series). The anomaly verdict instead measures the
/// observation against the full window of `window_size` observations
/// immediately before it: a point inside a small window drags its own
/// mean and deviation along, so judging it against the window that
/// precedes it is what actually isolates a spike. Observations without a
/// full preceding window are never flagged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingStat {
    pub rolling_mean: f64,
    /// Sample standard deviation of the trailing window; 0 for a
    /// single-observation window.
    pub rolling_std: f64,
    pub window_size_used: usize,
    pub is_anomaly: bool,
}

/// Running sum / sum-of-squares over a sliding window.
#[derive(Debug, Default)]
struct WindowAccumulator {
    sum: f64,
    sum_sq: f64,
    len: usize,
}

impl WindowAccumulator {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.sum_sq += value * value;
        self.len += 1;
    }

    fn evict(&mut self, value: f64) {
        self.sum -= value;
        self.sum_sq -= value * value;
        self.len -= 1;
    }

    fn mean(&self) -> f64 {
        self.sum / self.len as f64
    }

    fn sample_std(&self) -> f64 {
        if self.len < 2 {
            return 0.0;
        }
        // cancellation can push the numerator a hair below zero
        let centered = (self.sum_sq - self.sum * self.sum / self.len as f64).max(0.0);
        (centered / (self.len - 1) as f64).sqrt()
    }
}

/// Compute rolling statistics and anomaly flags for a whole series.
///
/// One `RollingStat` per observation, in series order. Single O(n) pass:
/// the accumulator slides over the series, and the window state just
/// before an observation is pushed doubles as that observation's causal
/// baseline. A `window_size` of 0 is treated as 1.
pub fn detect(series: &CitySeries, window_size: usize, sigma_threshold: f64) -> Vec<RollingStat> {
    let window_size = window_size.max(1);
    let temps: Vec<f64> = series.temperatures().collect();
    let mut acc = WindowAccumulator::default();
    let mut evict_at = 0usize;
    let mut result = Vec::with_capacity(temps.len());

    for (i, &temperature) in temps.iter().enumerate() {
        // acc currently holds the up-to-window_size observations
        // preceding index i
        let is_anomaly = if acc.len == window_size {
            let baseline_mean = acc.mean();
            let baseline_std = acc.sample_std();
            if baseline_std > ZERO_VARIANCE_EPS {
                (temperature - baseline_mean).abs() > sigma_threshold * baseline_std
            } else {
                // constant baseline: any real deviation is anomalous
                (temperature - baseline_mean).abs() > ZERO_VARIANCE_EPS
            }
        } else {
            false
        };

        acc.push(temperature);
        if acc.len > window_size {
            acc.evict(temps[evict_at]);
            evict_at += 1;
        }

        result.push(RollingStat {
            rolling_mean: acc.mean(),
            rolling_std: acc.sample_std(),
            window_size_used: acc.len,
            is_anomaly,
        });
    }
    result
}

#[cfg(test)]
mod tests {
    use super::{detect, RollingStat};
    use cta_owm::date_range::DateRange;
    use cta_owm::observation::Observation;
    use cta_owm::season::Season;
    use cta_owm::series::CitySeries;
    use chrono::NaiveDate;

    fn daily_series(temps: &[f64]) -> CitySeries {
        let start = NaiveDate::from_ymd_opt(2022, 4, 1).unwrap();
        let end = start + chrono::Duration::days(temps.len() as i64 - 1);
        let observations = DateRange(start, end)
            .zip(temps.iter())
            .map(|(date, &temperature)| Observation {
                city: "Testville".to_string(),
                date,
                temperature,
                season: Season::for_date(&date),
            })
            .collect();
        CitySeries {
            city: "Testville".to_string(),
            observations,
        }
    }

    fn naive_stats(window: &[f64]) -> (f64, f64) {
        let mean = window.iter().sum::<f64>() / window.len() as f64;
        if window.len() < 2 {
            return (mean, 0.0);
        }
        let var = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
            / (window.len() - 1) as f64;
        (mean, var.sqrt())
    }

    #[test]
    fn test_window_size_used_invariant() {
        let temps: Vec<f64> = (0..40).map(|i| (i as f64 * 0.7).sin() * 10.0).collect();
        let stats = detect(&daily_series(&temps), 7, 2.0);
        for (i, stat) in stats.iter().enumerate() {
            assert_eq!(stat.window_size_used, (i + 1).min(7));
        }
    }

    #[test]
    fn test_incremental_agrees_with_naive_recomputation() {
        let temps = [
            3.2, -1.0, 4.4, 8.9, 8.9, -12.5, 0.0, 7.1, 22.8, 22.8, -3.3, 15.0, 2.7,
        ];
        let window = 5;
        let stats = detect(&daily_series(&temps), window, 2.0);
        for (i, stat) in stats.iter().enumerate() {
            let lo = (i + 1).saturating_sub(window);
            let (mean, std) = naive_stats(&temps[lo..=i]);
            assert!((stat.rolling_mean - mean).abs() < 1e-9, "mean at {i}");
            assert!((stat.rolling_std - std).abs() < 1e-9, "std at {i}");
        }
    }

    #[test]
    fn test_deterministic() {
        let temps: Vec<f64> = (0..100).map(|i| ((i * 31) % 17) as f64 - 8.0).collect();
        let series = daily_series(&temps);
        let first = detect(&series, 30, 2.0);
        let second = detect(&series, 30, 2.0);
        assert_eq!(first, second);
    }

    #[test]
    fn test_constant_series_has_no_anomalies() {
        let temps = vec![0.1; 50];
        let stats = detect(&daily_series(&temps), 10, 2.0);
        for stat in &stats {
            assert_eq!(stat.rolling_std, 0.0);
            assert!(!stat.is_anomaly);
        }
    }

    #[test]
    fn test_spike_after_stable_run_is_flagged() {
        let mut temps = vec![10.0; 10];
        temps.push(30.0);
        temps.push(10.0);
        let stats = detect(&daily_series(&temps), 10, 2.0);
        let flagged: Vec<usize> = stats
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_anomaly)
            .map(|(i, _)| i)
            .collect();
        // the spike deviates from its constant baseline; the return to
        // 10.0 is within 2 sigma of the spike-contaminated window
        assert_eq!(flagged, vec![10]);
    }

    #[test]
    fn test_single_spike_fixture() {
        let temps = [1.0, 2.0, 3.0, 4.0, 100.0];
        let stats = detect(&daily_series(&temps), 4, 2.0);
        let flagged: Vec<usize> = stats
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_anomaly)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(flagged, vec![4]);
        // reported stats at the spike still describe the trailing window
        // including it
        assert_eq!(stats[4].window_size_used, 4);
        assert!((stats[4].rolling_mean - 27.25).abs() < 1e-9);
    }

    #[test]
    fn test_short_series_never_flags() {
        let temps = [0.0, 50.0];
        let stats = detect(&daily_series(&temps), 30, 2.0);
        assert!(stats.iter().all(|s| !s.is_anomaly));
    }

    #[test]
    fn test_window_size_zero_behaves_as_one() {
        let temps = [5.0, 5.0, 9.0];
        let stats = detect(&daily_series(&temps), 0, 2.0);
        assert!(stats.iter().all(|s| s.window_size_used == 1));
        // each point is judged against the single preceding observation
        assert!(!stats[1].is_anomaly);
        assert!(stats[2].is_anomaly);
    }

    #[test]
    fn test_empty_series_yields_no_stats() {
        let stats = detect(&daily_series(&[]), 30, 2.0);
        assert!(stats.is_empty());
    }

    #[test]
    fn test_stat_shape() {
        let stats = detect(&daily_series(&[7.0]), 3, 2.0);
        assert_eq!(
            stats,
            vec![RollingStat {
                rolling_mean: 7.0,
                rolling_std: 0.0,
                window_size_used: 1,
                is_anomaly: false,
            }]
        );
    }
}
