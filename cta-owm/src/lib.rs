#[cfg(feature = "api")]
pub mod client;
pub mod date_range;
pub mod error;
pub mod observation;
pub mod season;
pub mod series;
