//! Full analysis of a history CSV.

use anyhow::Context;
use chrono::Local;
use cta_analysis::analyze::{analyze, AnalysisConfig, AnalysisOutput};
use cta_owm::observation::parse_history_csv;
use cta_utils::dates::format_date;
use log::{info, warn};
use std::collections::BTreeMap;

/// Run a full analysis of a temperature history CSV.
///
/// Logs the load report, the seasonal profiles, and the per-city
/// descriptive summary, and optionally writes the annotated series
/// (every observation with its rolling statistics and both anomaly
/// flags) to a CSV for downstream charting.
pub fn run_analyze(
    history_csv: &str,
    annotated_csv: Option<&str>,
    window: usize,
    sigma: f64,
) -> anyhow::Result<()> {
    let body = std::fs::read_to_string(history_csv)
        .with_context(|| format!("failed to read {history_csv}"))?;
    let records = parse_history_csv(&body)?;

    let config = AnalysisConfig {
        window_size: window,
        sigma_threshold: sigma,
        ..AnalysisConfig::default()
    };
    let today = Local::now().naive_local().date();
    let output = analyze(records, &BTreeMap::new(), &config, today);

    let report = &output.load_report;
    info!(
        "Loaded {} observations across {} cities ({} rejected, {} duplicates replaced)",
        report.accepted - report.duplicates_replaced,
        output.annotated.len(),
        report.rejected(),
        report.duplicates_replaced
    );
    for (reason, count) in &report.rejections {
        warn!("  {} records dropped: {:?}", count, reason);
    }

    for ((city, season), profile) in &output.profiles {
        info!(
            "{} {}: {:.2} ± {:.2} °C over {} samples (range {:.1} to {:.1})",
            city, season, profile.mean, profile.std, profile.sample_count, profile.min, profile.max
        );
    }

    for (city, summary) in &output.summaries {
        let stats = &summary.stats;
        info!(
            "{}: {} days, mean {:.2} °C, median {:.2} °C, std {:.2} °C, range {:.1} to {:.1} °C",
            city, stats.count, stats.mean, stats.median, stats.std, stats.min, stats.max
        );
        if let Some(trend) = &summary.trend {
            info!(
                "{}: trend {:+.3} °C/year ({:+.2} °C over {:.1} years)",
                city, trend.slope_per_year, trend.total_change, trend.span_years
            );
        }
        let flagged = output.annotated[city]
            .iter()
            .filter(|row| row.rolling.is_anomaly)
            .count();
        info!("{}: {} rolling anomalies at {}σ", city, flagged, sigma);
    }

    if let Some(path) = annotated_csv {
        write_annotated_csv(path, &output)?;
        info!("Annotated series written to {}", path);
    }
    Ok(())
}

fn write_annotated_csv(path: &str, output: &AnalysisOutput) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record([
        "city",
        "timestamp",
        "temperature",
        "season",
        "rolling_mean",
        "rolling_std",
        "window_size_used",
        "rolling_anomaly",
        "seasonal_anomaly",
    ])?;
    for rows in output.annotated.values() {
        for row in rows {
            let obs = &row.observation;
            wtr.write_record([
                obs.city.clone(),
                format_date(&obs.date),
                format!("{:.2}", obs.temperature),
                obs.season.to_string(),
                format!("{:.4}", row.rolling.rolling_mean),
                format!("{:.4}", row.rolling.rolling_std),
                row.rolling.window_size_used.to_string(),
                row.rolling.is_anomaly.to_string(),
                row.is_seasonal_anomaly.to_string(),
            ])?;
        }
    }
    wtr.flush()?;
    Ok(())
}
