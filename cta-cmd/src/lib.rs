//! Command implementations for the CTA CLI.
//!
//! Provides subcommands for analyzing a temperature history CSV and for
//! checking live OpenWeatherMap readings against seasonal baselines.

use clap::Subcommand;

pub mod analyze;
pub mod live;

#[derive(Subcommand)]
pub enum Command {
    /// Analyze a history CSV: seasonal profiles, rolling anomalies, trends
    Analyze {
        /// Path to history CSV (columns: city,timestamp,temperature[,season])
        #[arg(short = 'i', long)]
        history_csv: String,

        /// Output path for the annotated observations CSV
        #[arg(short = 'o', long)]
        annotated_csv: Option<String>,

        /// Trailing window length in days
        #[arg(long, default_value_t = 30)]
        window: usize,

        /// Sigma multiple beyond which a deviation is anomalous
        #[arg(long, default_value_t = 2.0)]
        sigma: f64,
    },

    /// Fetch current temperatures and compare them to seasonal baselines
    LiveCheck {
        /// Path to history CSV providing the baselines
        #[arg(short = 'i', long)]
        history_csv: String,

        /// Cities to check; defaults to every city in the history
        #[arg(short = 'c', long)]
        cities: Vec<String>,

        /// OpenWeatherMap API key (falls back to OWM_API_KEY)
        #[arg(long)]
        api_key: Option<String>,

        /// Date deciding the current season, YYYY-MM-DD (default: today)
        #[arg(long)]
        as_of: Option<String>,

        /// Sigma multiple beyond which a reading is anomalous
        #[arg(long, default_value_t = 2.0)]
        sigma: f64,
    },

    /// Fetch and print current conditions for cities
    Fetch {
        /// Cities to fetch
        #[arg(short = 'c', long, required = true)]
        cities: Vec<String>,

        /// OpenWeatherMap API key (falls back to OWM_API_KEY)
        #[arg(long)]
        api_key: Option<String>,
    },
}

pub async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Analyze {
            history_csv,
            annotated_csv,
            window,
            sigma,
        } => analyze::run_analyze(&history_csv, annotated_csv.as_deref(), window, sigma),
        Command::LiveCheck {
            history_csv,
            cities,
            api_key,
            as_of,
            sigma,
        } => live::run_live_check(&history_csv, &cities, api_key, as_of.as_deref(), sigma).await,
        Command::Fetch { cities, api_key } => live::run_fetch(&cities, api_key).await,
    }
}
