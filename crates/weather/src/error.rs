use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherError {
    /// No API key was supplied.
    #[error("WEATHER_API_KEY not set")]
    MissingKey,

    /// The request failed, returned an error status, or the body was not JSON.
    #[error("Error fetching weather data for {location}: {detail}")]
    Fetch { location: String, detail: String },

    /// The body was JSON but lacked a field or had one of the wrong type.
    #[error("Unexpected response format from weather API: {0}")]
    Format(String),
}

pub type Result<T> = std::result::Result<T, WeatherError>;
