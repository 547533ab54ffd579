//! Seasonal and rolling anomaly analysis for city temperature series.
//!
//! This crate turns the per-city series built by `cta-owm` into the
//! statistics the rest of the system consumes: seasonal baselines,
//! rolling-window statistics with anomaly flags, live-reading verdicts,
//! and per-city descriptive summaries. Everything here is a pure
//! function of its inputs and performs no I/O.

pub mod analyze;
pub mod descriptive;
pub mod live;
pub mod profile;
pub mod rolling;
pub mod stats;
