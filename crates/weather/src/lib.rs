//! Weather lookup tool.
//!
//! [`WeatherClient`] proxies weatherapi.com and always produces text, even
//! on failure. [`WeatherServer`] exposes it as the MCP tool `get_weather`.

mod client;
mod error;
mod server;

pub use client::{
    API_KEY_VAR, BASE_URL_VAR, Condition, Current, CurrentWeather, DEFAULT_BASE_URL, Location,
    REQUEST_TIMEOUT, WeatherClient,
};
pub use error::{Result, WeatherError};
pub use server::{GetWeatherRequest, WeatherServer};
