/// Error types for the OWM library
use thiserror::Error;

/// Main error type for city temperature operations
#[derive(Error, Debug)]
pub enum OwmError {
    /// HTTP request failed
    #[cfg(feature = "api")]
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// The API rejected the key; see https://openweathermap.org/faq#error401
    #[error("Invalid API key: {0}")]
    InvalidApiKey(String),

    /// No API key supplied and OWM_API_KEY is unset
    #[error("OpenWeatherMap API key is missing")]
    MissingApiKey,

    /// Non-success response from the weather API
    #[error("API error {status}: {message}")]
    ApiStatus { status: u16, message: String },

    /// The weather payload did not carry a usable temperature
    #[error("Malformed weather response for {0}")]
    MalformedResponse(String),

    /// Failed to parse CSV data
    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),

    /// A required column is absent from the CSV header
    #[error("Missing column in header: {0}")]
    MissingColumn(&'static str),
}

/// Type alias for Results using OwmError
pub type Result<T> = std::result::Result<T, OwmError>;
