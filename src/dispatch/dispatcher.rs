use std::sync::LazyLock;

use regex::Regex;

use crate::dispatch::registry::{Provider, ProviderRegistry};
use crate::dispatch::response::{QueryResponse, TraceStep};
use crate::dispatch::weather::{Observation, WeatherClient, WeatherError};

/// Location used when a weather query names no place.
pub const DEFAULT_LOCATION: &str = "San Francisco";

// Captures the place name after "weather in/at/for". The character class
// stops at the first hyphen or digit, so "Winston-Salem" extracts as
// "Winston".
static LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)weather\s+(?:in|at|for)\s+([a-zA-Z\s,]+)").expect("location pattern is valid")
});

/// Response strategy selected for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// No usable credential; answer with configuration guidance.
    Unconfigured,
    /// Weather lookup for the extracted location.
    Weather { location: String },
    /// Canned language-model answer.
    LanguageModel,
    /// Generic guidance answer.
    Fallback,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unconfigured => "unconfigured",
            Self::Weather { .. } => "weather",
            Self::LanguageModel => "language_model",
            Self::Fallback => "fallback",
        }
    }
}

/// Picks the response strategy for `query` against the registry snapshot.
/// Ordered rules, first match wins.
pub fn plan(query: &str, registry: &ProviderRegistry) -> Route {
    if !registry.is_any_configured() {
        return Route::Unconfigured;
    }
    if query.to_lowercase().contains("weather") && registry.get(Provider::Weather).is_some() {
        let location =
            extract_location(query).unwrap_or_else(|| DEFAULT_LOCATION.to_string());
        return Route::Weather { location };
    }
    if registry.get(Provider::LanguageModel).is_some() {
        return Route::LanguageModel;
    }
    Route::Fallback
}

/// Maps `query` to exactly one response strategy and produces the response.
///
/// Only the weather route performs I/O; every other route is deterministic
/// string composition. Provider failures are converted into a response with
/// a populated `error` field and never propagate past this boundary.
pub async fn dispatch(
    query: &str,
    registry: &ProviderRegistry,
    weather: &WeatherClient,
) -> QueryResponse {
    match plan(query, registry) {
        Route::Unconfigured => unconfigured_response(query),
        Route::Weather { location } => {
            let lookup = match registry.get(Provider::Weather) {
                Some(credential) => weather.current(&location, credential).await,
                None => Err(WeatherError::MissingCredential),
            };
            match lookup {
                Ok(observation) => weather_response(&location, &observation),
                Err(err) => weather_failure_response(&err),
            }
        }
        Route::LanguageModel => language_model_response(query),
        Route::Fallback => fallback_response(query),
    }
}

fn extract_location(query: &str) -> Option<String> {
    LOCATION
        .captures(query)
        .and_then(|captures| captures.get(1))
        .map(|group| group.as_str().trim().to_string())
        .filter(|location| !location.is_empty())
}

/// Celsius to Fahrenheit, rounded to one decimal.
fn fahrenheit(celsius: f64) -> f64 {
    ((celsius * 9.0 / 5.0 + 32.0) * 10.0).round() / 10.0
}

fn unconfigured_response(query: &str) -> QueryResponse {
    QueryResponse {
        answer: format!(
            "To fully answer your query: \"{query}\", save at least one provider \
             credential with `qroute config set`."
        ),
        steps: vec![
            TraceStep::new(
                "Configure Providers",
                "Provider credentials are required for real-time data",
            ),
            TraceStep::new(
                "Process Query",
                "Resubmit your question once a credential is saved",
            ),
            TraceStep::new("View Results", "Results will appear after processing"),
        ],
        error: None,
    }
}

fn weather_response(requested: &str, observation: &Observation) -> QueryResponse {
    let answer = format!(
        "The current weather in {} is {} with a temperature of {}°C ({:.1}°F). \
         The humidity is {}% and wind speed is {} m/s.",
        observation.place,
        observation.description,
        observation.temp_c,
        fahrenheit(observation.temp_c),
        observation.humidity,
        observation.wind_speed,
    );
    QueryResponse {
        answer,
        steps: vec![
            TraceStep::new(
                "Parse Query",
                format!("Identified weather request for \"{requested}\""),
            ),
            TraceStep::new("Retrieve Data", "Connected to weather service API"),
            TraceStep::new("Generate Response", "Formatted weather information"),
        ],
        error: None,
    }
}

fn weather_failure_response(err: &WeatherError) -> QueryResponse {
    QueryResponse {
        answer: "I ran into a problem retrieving weather data. Check the saved weather \
                 credential with `qroute config show` and try again."
            .to_string(),
        steps: vec![TraceStep::new("Error", "Failed to retrieve weather data")],
        error: Some(err.to_string()),
    }
}

fn language_model_response(query: &str) -> QueryResponse {
    QueryResponse {
        answer: format!(
            "Here's what I found for \"{query}\":\n\nThis response was generated with \
             your language-model credential. In a production deployment the query would \
             be forwarded to the configured language-model backend for full processing."
        ),
        steps: vec![
            TraceStep::new("Query Analysis", "Understand the question intent and entities"),
            TraceStep::new("Knowledge Retrieval", "Search for relevant information"),
            TraceStep::new("Response Generation", "Create a comprehensive answer"),
        ],
        error: None,
    }
}

fn fallback_response(query: &str) -> QueryResponse {
    QueryResponse {
        answer: format!(
            "I processed your query: \"{query}\"\n\nFor weather questions, try asking \
             something like \"What's the weather like in New York?\"\n\nFor richer \
             answers, save a language-model credential with `qroute config set`."
        ),
        steps: vec![
            TraceStep::new("Query Analysis", "Parsed your question"),
            TraceStep::new("Response Generation", "Created a basic response"),
        ],
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        DEFAULT_LOCATION, Route, extract_location, fahrenheit, plan, unconfigured_response,
        weather_failure_response, weather_response,
    };
    use crate::dispatch::registry::{Provider, ProviderRegistry};
    use crate::dispatch::weather::{Observation, WeatherError};

    fn registry_with(credentials: Vec<(Provider, &str)>) -> ProviderRegistry {
        let mut registry = ProviderRegistry::new();
        registry.configure(
            credentials
                .into_iter()
                .map(|(provider, value)| (provider, value.to_string())),
        );
        registry
    }

    fn paris_observation() -> Observation {
        Observation {
            place: "Paris".to_string(),
            description: "clear sky".to_string(),
            temp_c: 20.0,
            humidity: 50.0,
            wind_speed: 3.0,
        }
    }

    #[test]
    fn location_follows_in_at_or_for() {
        assert_eq!(
            extract_location("What's the weather in Paris?"),
            Some("Paris".to_string())
        );
        assert_eq!(
            extract_location("weather at London"),
            Some("London".to_string())
        );
        assert_eq!(
            extract_location("Weather FOR New York"),
            Some("New York".to_string())
        );
    }

    #[test]
    fn location_keeps_commas_and_spaces() {
        assert_eq!(
            extract_location("weather in San Francisco, CA?"),
            Some("San Francisco, CA".to_string())
        );
    }

    #[test]
    fn location_stops_at_hyphens_and_digits() {
        assert_eq!(
            extract_location("weather in Winston-Salem"),
            Some("Winston".to_string())
        );
        assert_eq!(
            extract_location("weather in Area51"),
            Some("Area".to_string())
        );
    }

    #[test]
    fn missing_location_phrase_yields_none() {
        assert_eq!(extract_location("weather"), None);
        assert_eq!(extract_location("how is the weather today"), None);
    }

    #[test]
    fn fahrenheit_conversion_rounds_to_one_decimal() {
        assert_eq!(fahrenheit(20.0), 68.0);
        assert_eq!(fahrenheit(0.0), 32.0);
        assert_eq!(fahrenheit(-40.0), -40.0);
        assert_eq!(fahrenheit(19.72), 67.5);
        assert_eq!(fahrenheit(36.7), 98.1);
    }

    #[test]
    fn unconfigured_registry_routes_to_guidance() {
        let registry = ProviderRegistry::new();
        assert_eq!(plan("What's the weather in Paris?", &registry), Route::Unconfigured);
        assert_eq!(plan("hello", &registry), Route::Unconfigured);
    }

    #[test]
    fn short_credentials_still_route_to_guidance() {
        let registry = registry_with(vec![(Provider::Weather, "12345")]);
        assert_eq!(plan("weather in Paris", &registry), Route::Unconfigured);
    }

    #[test]
    fn weather_query_with_weather_key_routes_to_weather() {
        let registry = registry_with(vec![(Provider::Weather, "weather-key")]);
        assert_eq!(
            plan("What's the WEATHER in Paris?", &registry),
            Route::Weather {
                location: "Paris".to_string()
            }
        );
    }

    #[test]
    fn weather_query_without_location_uses_default() {
        let registry = registry_with(vec![(Provider::Weather, "weather-key")]);
        assert_eq!(
            plan("weather", &registry),
            Route::Weather {
                location: DEFAULT_LOCATION.to_string()
            }
        );
    }

    #[test]
    fn short_weather_key_beside_long_key_still_routes_to_weather() {
        // A 1-to-5-char weather key routes to the lookup and fails lazily
        // upstream once another credential makes the registry configured.
        let registry = registry_with(vec![
            (Provider::Weather, "abc"),
            (Provider::LanguageModel, "language-model-key"),
        ]);
        assert_eq!(
            plan("weather in Paris", &registry),
            Route::Weather {
                location: "Paris".to_string()
            }
        );
    }

    #[test]
    fn non_weather_query_prefers_language_model() {
        let registry = registry_with(vec![
            (Provider::Weather, "weather-key"),
            (Provider::LanguageModel, "language-model-key"),
        ]);
        assert_eq!(plan("what is an agent?", &registry), Route::LanguageModel);
    }

    #[test]
    fn weather_query_without_weather_key_falls_through() {
        let registry = registry_with(vec![(Provider::LanguageModel, "language-model-key")]);
        assert_eq!(plan("weather in Paris", &registry), Route::LanguageModel);
    }

    #[test]
    fn search_key_alone_routes_to_fallback() {
        let registry = registry_with(vec![(Provider::Search, "search-key")]);
        assert_eq!(plan("what is an agent?", &registry), Route::Fallback);
        assert_eq!(plan("weather in Paris", &registry), Route::Fallback);
    }

    #[test]
    fn weather_answer_embeds_all_readings() {
        let response = weather_response("Paris", &paris_observation());
        assert!(response.answer.contains("Paris"));
        assert!(response.answer.contains("clear sky"));
        assert!(response.answer.contains("20"));
        assert!(response.answer.contains("68.0"));
        assert!(response.answer.contains("50%"));
        assert!(response.answer.contains("3 m/s"));
        assert_eq!(response.steps.len(), 3);
        assert_eq!(response.steps[0].label, "Parse Query");
        assert!(response.error.is_none());
    }

    #[test]
    fn weather_answer_is_deterministic() {
        let first = weather_response("Paris", &paris_observation());
        let second = weather_response("Paris", &paris_observation());
        assert_eq!(first, second);
    }

    #[test]
    fn failure_response_keeps_detail_out_of_the_answer() {
        let response = weather_failure_response(&WeatherError::EmptyResponse);
        assert!(response.answer.contains("problem retrieving weather data"));
        assert!(!response.answer.contains("conditions"));
        assert_eq!(
            response.error.as_deref(),
            Some("weather response did not contain any conditions")
        );
        assert_eq!(response.steps.len(), 1);
        assert_eq!(response.steps[0].label, "Error");
    }

    #[test]
    fn unconfigured_response_has_three_fixed_steps() {
        let response = unconfigured_response("hello");
        assert_eq!(response.steps.len(), 3);
        assert_eq!(response.steps[0].label, "Configure Providers");
        assert!(response.answer.contains("\"hello\""));
        assert!(response.error.is_none());
    }
}
