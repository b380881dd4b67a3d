//! weatherapi.com client.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{Number, Value};

use crate::error::{Result, WeatherError};

pub const DEFAULT_BASE_URL: &str = "http://api.weatherapi.com";
pub const API_KEY_VAR: &str = "WEATHER_API_KEY";
pub const BASE_URL_VAR: &str = "WEATHER_API_URL";

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Current conditions for one location.
///
/// Numbers keep the representation the API sent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrentWeather {
    pub location: Location,
    pub current: Current,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Location {
    pub name: String,
    pub region: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Current {
    pub temp_c: Number,
    pub temp_f: Number,
    pub condition: Condition,
    pub humidity: Number,
    pub wind_kph: Number,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Condition {
    pub text: String,
}

impl fmt::Display for CurrentWeather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Location {
            name,
            region,
            country,
        } = &self.location;
        let current = &self.current;
        writeln!(f, "Current weather in {name}, {region}, {country}:")?;
        writeln!(
            f,
            "Temperature: {}°C ({}°F)",
            current.temp_c, current.temp_f
        )?;
        writeln!(f, "Condition: {}", current.condition.text)?;
        writeln!(f, "Humidity: {}%", current.humidity)?;
        write!(f, "Wind Speed: {} km/h", current.wind_kph)
    }
}

/// Fetches current conditions. One GET per lookup, no retries.
#[derive(Clone)]
pub struct WeatherClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl WeatherClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Read `WEATHER_API_KEY` and the optional `WEATHER_API_URL`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(WeatherError::MissingKey)?;
        let mut client = Self::new(api_key);
        if let Ok(base_url) = std::env::var(BASE_URL_VAR) {
            client = client.with_base_url(base_url);
        }
        Ok(client)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Bound on the whole request, body included.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Look up the current conditions for `location`.
    pub async fn fetch(&self, location: &str) -> Result<CurrentWeather> {
        let fetch_error = |detail: String| WeatherError::Fetch {
            location: location.to_string(),
            detail,
        };

        let url = reqwest::Url::parse_with_params(
            &format!("{}/v1/current.json", self.base_url),
            [("key", self.api_key.as_str()), ("q", location), ("aqi", "no")],
        )
        .map_err(|e| fetch_error(e.to_string()))?;

        // The URL carries the key, so it is stripped from every error.
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| fetch_error(error_detail(&e.without_url())))?;
        let body = response
            .text()
            .await
            .map_err(|e| fetch_error(error_detail(&e.without_url())))?;
        let value: Value = serde_json::from_str(&body).map_err(|e| fetch_error(e.to_string()))?;

        decode(value)
    }

    /// Like [`fetch`](Self::fetch), but renders failures as text.
    ///
    /// This never fails; the model sees the error message as the tool
    /// output.
    pub async fn current(&self, location: &str) -> String {
        match self.fetch(location).await {
            Ok(weather) => weather.to_string(),
            Err(e) => {
                tracing::warn!(%location, error = %e, "weather lookup failed");
                e.to_string()
            }
        }
    }
}

/// The error and each of its causes, joined with `": "`.
fn error_detail(error: &dyn std::error::Error) -> String {
    let mut detail = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let message = cause.to_string();
        if !detail.ends_with(&message) {
            detail.push_str(": ");
            detail.push_str(&message);
        }
        source = cause.source();
    }
    detail
}

fn decode(value: Value) -> Result<CurrentWeather> {
    serde_path_to_error::deserialize(value).map_err(|err| {
        let path = err.path().to_string();
        WeatherError::Format(format!("{path}: {}", err.into_inner()))
    })
}
