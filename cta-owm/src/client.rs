//! OpenWeatherMap current-weather client.
//!
//! Fetches the current temperature for one or many cities. The analysis
//! crates never talk to the network; they consume the city → temperature
//! map this module produces. A city whose fetch fails is logged and left
//! out of that map, which downstream code treats as "nothing to check".
//!
//! # OWM API
//!
//! - URL: `https://api.openweathermap.org/data/2.5/weather`
//! - Query: `q={city}&appid={key}&units=metric`
//! - The payload carries the temperature in `main.temp` (°C with
//!   `units=metric`) and a short text in `weather[0].description`.
//! - A 401 means the API key is missing/invalid; see
//!   <https://openweathermap.org/faq#error401>.

use crate::error::{OwmError, Result};
use futures::future::join_all;
use log::warn;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Endpoint for current weather conditions.
pub const OWM_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Environment variable consulted when no explicit API key is given.
pub const API_KEY_ENV: &str = "OWM_API_KEY";

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// The slice of the OWM payload this toolkit uses.
#[derive(Debug, Deserialize)]
pub struct WeatherPayload {
    pub main: Option<MainBlock>,
    #[serde(default)]
    pub weather: Vec<ConditionBlock>,
}

#[derive(Debug, Deserialize)]
pub struct MainBlock {
    pub temp: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ConditionBlock {
    #[serde(default)]
    pub description: String,
}

/// Current conditions for one city.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    pub city: String,
    /// Temperature in °C
    pub temperature: f64,
    pub description: String,
}

impl CurrentConditions {
    /// Extract conditions from a decoded payload.
    pub fn from_payload(city: &str, payload: WeatherPayload) -> Result<CurrentConditions> {
        let temperature = payload
            .main
            .and_then(|m| m.temp)
            .ok_or_else(|| OwmError::MalformedResponse(city.to_string()))?;
        let description = payload
            .weather
            .into_iter()
            .next()
            .map(|c| c.description)
            .unwrap_or_default();
        Ok(CurrentConditions {
            city: city.to_string(),
            temperature,
            description,
        })
    }
}

/// Client for the OpenWeatherMap current-weather API.
pub struct OwmClient {
    client: reqwest::Client,
    api_key: String,
}

impl OwmClient {
    /// Build a client. Key resolution order: explicit argument, then the
    /// `OWM_API_KEY` environment variable.
    pub fn new(api_key: Option<String>) -> Result<OwmClient> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()))
            .ok_or(OwmError::MissingApiKey)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(OwmClient { client, api_key })
    }

    /// Fetch current conditions for a single city.
    pub async fn fetch_current(&self, city: &str) -> Result<CurrentConditions> {
        let response = self
            .client
            .get(OWM_URL)
            .query(&[("q", city), ("appid", self.api_key.as_str()), ("units", "metric")])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status == reqwest::StatusCode::UNAUTHORIZED {
                let message = serde_json::from_str::<serde_json::Value>(&body)
                    .ok()
                    .and_then(|v| v.get("message")?.as_str().map(String::from))
                    .unwrap_or(body);
                return Err(OwmError::InvalidApiKey(message));
            }
            return Err(OwmError::ApiStatus {
                status: status.as_u16(),
                message: body,
            });
        }
        let payload: WeatherPayload = response.json().await?;
        CurrentConditions::from_payload(city, payload)
    }

    /// Fetch current conditions for many cities concurrently.
    ///
    /// Failed cities are logged and absent from the result; a partial map
    /// is a normal outcome, not an error.
    pub async fn fetch_current_many(
        &self,
        cities: &[String],
    ) -> BTreeMap<String, CurrentConditions> {
        let results = join_all(cities.iter().map(|city| self.fetch_current(city))).await;
        let mut current = BTreeMap::new();
        for (city, result) in cities.iter().zip(results) {
            match result {
                Ok(conditions) => {
                    current.insert(city.clone(), conditions);
                }
                Err(e) => warn!("Failed to fetch current weather for {}: {}", city, e),
            }
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::{CurrentConditions, WeatherPayload};

    // https://api.openweathermap.org/data/2.5/weather?q=Berlin&units=metric
    const STR_PAYLOAD: &str = r#"{
        "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
        "main": {"temp": 7.17, "feels_like": 4.5, "temp_min": 6.1, "temp_max": 8.3,
                 "pressure": 1021, "humidity": 87},
        "name": "Berlin",
        "cod": 200
    }"#;

    #[test]
    fn test_payload_decoding() {
        let payload: WeatherPayload = serde_json::from_str(STR_PAYLOAD).unwrap();
        let conditions = CurrentConditions::from_payload("Berlin", payload).unwrap();
        assert_eq!(conditions.city, "Berlin");
        assert!((conditions.temperature - 7.17).abs() < f64::EPSILON);
        assert_eq!(conditions.description, "light rain");
    }

    #[test]
    fn test_payload_without_temperature_is_malformed() {
        let payload: WeatherPayload = serde_json::from_str(r#"{"weather": []}"#).unwrap();
        assert!(CurrentConditions::from_payload("Berlin", payload).is_err());
    }

    #[test]
    fn test_payload_without_conditions_still_decodes() {
        let payload: WeatherPayload =
            serde_json::from_str(r#"{"main": {"temp": -3.0}}"#).unwrap();
        let conditions = CurrentConditions::from_payload("Oslo", payload).unwrap();
        assert_eq!(conditions.temperature, -3.0);
        assert_eq!(conditions.description, "");
    }
}
