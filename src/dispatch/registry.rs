use std::collections::HashMap;

/// A credential must be longer than this to count as configured.
const CREDENTIAL_MIN_LEN: usize = 5;

/// Named external data/service source identified by a credential string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Weather,
    Search,
    LanguageModel,
}

impl Provider {
    /// All providers, in display order.
    pub const ALL: [Provider; 3] = [Self::Weather, Self::Search, Self::LanguageModel];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::Search => "search",
            Self::LanguageModel => "language_model",
        }
    }

    /// Key under which the credential is persisted.
    pub fn storage_key(self) -> &'static str {
        match self {
            Self::Weather => "weather_api_key",
            Self::Search => "google_api_key",
            Self::LanguageModel => "langchain_api_key",
        }
    }

    /// Environment variable that overrides the stored credential.
    pub fn api_key_env(self) -> &'static str {
        match self {
            Self::Weather => "WEATHER_API_KEY",
            Self::Search => "GOOGLE_API_KEY",
            Self::LanguageModel => "LANGCHAIN_API_KEY",
        }
    }
}

/// Owned snapshot of configured provider credentials.
///
/// Constructed once per process and passed by reference into dispatch.
/// An absent or empty credential means "not configured".
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    credentials: HashMap<Provider, String>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the held credentials wholesale. Empty strings are dropped,
    /// which clears that provider. Credential correctness is not checked
    /// here; a bad key fails on first use.
    pub fn configure(&mut self, credentials: impl IntoIterator<Item = (Provider, String)>) {
        self.credentials = credentials
            .into_iter()
            .filter(|(_, value)| !value.is_empty())
            .collect();
    }

    /// Returns the credential for `provider` if one is present.
    pub fn get(&self, provider: Provider) -> Option<&str> {
        self.credentials.get(&provider).map(String::as_str)
    }

    /// True once at least one credential is longer than
    /// [`CREDENTIAL_MIN_LEN`] characters.
    pub fn is_any_configured(&self) -> bool {
        self.credentials
            .values()
            .any(|value| value.len() > CREDENTIAL_MIN_LEN)
    }

    /// Providers holding a credential, in display order.
    pub fn configured(&self) -> Vec<Provider> {
        Provider::ALL
            .into_iter()
            .filter(|provider| self.get(*provider).is_some())
            .collect()
    }
}
