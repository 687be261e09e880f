use std::env;
use std::fmt;

use reqwest::StatusCode;
use serde::Deserialize;

const OPENWEATHERMAP_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Environment override for the endpoint (testing or proxying).
pub const BASE_URL_ENV: &str = "QR_WEATHER_BASE_URL";

/// Client for the OpenWeatherMap current-weather endpoint.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for WeatherClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WeatherClient {
    pub fn new() -> Self {
        Self::with_base_url(OPENWEATHERMAP_URL)
    }

    /// Custom base URL (for testing or proxying).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Honors [`BASE_URL_ENV`] when set, otherwise uses the public endpoint.
    pub fn from_env() -> Self {
        match env::var(BASE_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Self::with_base_url(url.trim()),
            _ => Self::new(),
        }
    }

    /// Fetches current conditions for `location` in metric units.
    ///
    /// One GET, no timeout, no retry; a failed lookup is reported to the
    /// caller and the user resubmits.
    pub async fn current(
        &self,
        location: &str,
        api_key: &str,
    ) -> Result<Observation, WeatherError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", location), ("appid", api_key), ("units", "metric")])
            .send()
            .await
            .map_err(WeatherError::Request)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(WeatherError::Api { status, body });
        }

        let payload: WeatherPayload = response
            .json()
            .await
            .map_err(WeatherError::Request)?;
        Observation::from_payload(payload)
    }
}

#[derive(Debug, Deserialize)]
struct WeatherPayload {
    name: String,
    weather: Vec<Condition>,
    main: Readings,
    wind: Wind,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct Readings {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct Wind {
    speed: f64,
}

/// Current conditions for one place.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub place: String,
    pub description: String,
    /// Temperature in Celsius at the provider's native precision.
    pub temp_c: f64,
    /// Relative humidity in percent.
    pub humidity: f64,
    /// Wind speed in m/s.
    pub wind_speed: f64,
}

impl Observation {
    fn from_payload(payload: WeatherPayload) -> Result<Self, WeatherError> {
        let description = payload
            .weather
            .into_iter()
            .next()
            .map(|condition| condition.description)
            .ok_or(WeatherError::EmptyResponse)?;
        Ok(Self {
            place: payload.name,
            description,
            temp_c: payload.main.temp,
            humidity: payload.main.humidity,
            wind_speed: payload.wind.speed,
        })
    }
}

#[derive(Debug)]
pub enum WeatherError {
    MissingCredential,
    Request(reqwest::Error),
    Api { status: StatusCode, body: String },
    EmptyResponse,
}

impl fmt::Display for WeatherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCredential => write!(f, "weather credential is not configured"),
            Self::Request(source) => write!(f, "weather request failed: {source}"),
            Self::Api { status, body } => write!(f, "weather API error {status}: {body}"),
            Self::EmptyResponse => {
                write!(f, "weather response did not contain any conditions")
            }
        }
    }
}

impl std::error::Error for WeatherError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Request(source) => Some(source),
            _ => None,
        }
    }
}
