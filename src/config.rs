use std::env;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::dispatch::registry::{Provider, ProviderRegistry};

/// Environment override for the store location.
pub const CONFIG_PATH_ENV: &str = "QR_CONFIG";

/// Persisted provider credentials.
///
/// One flat key per provider plus the `api_configured` marker, stored as
/// TOML. A missing file reads as an empty store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CredentialStore {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub langchain_api_key: Option<String>,
    #[serde(default)]
    pub api_configured: bool,
}

impl CredentialStore {
    /// Returns the stored credential for `provider` if it is non-empty.
    pub fn get(&self, provider: Provider) -> Option<&str> {
        let value = match provider {
            Provider::Weather => self.weather_api_key.as_deref(),
            Provider::Search => self.google_api_key.as_deref(),
            Provider::LanguageModel => self.langchain_api_key.as_deref(),
        };
        value.filter(|credential| !credential.is_empty())
    }

    /// Stores a credential; an empty value clears that provider.
    pub fn set(&mut self, provider: Provider, credential: &str) {
        let slot = match provider {
            Provider::Weather => &mut self.weather_api_key,
            Provider::Search => &mut self.google_api_key,
            Provider::LanguageModel => &mut self.langchain_api_key,
        };
        *slot = if credential.is_empty() {
            None
        } else {
            Some(credential.to_string())
        };
    }
}

/// Resolves the store path from `QR_CONFIG`, `XDG_CONFIG_HOME`, or `HOME`.
pub fn config_path() -> Result<PathBuf, String> {
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }

    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        let trimmed = xdg.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed).join("qroute").join("config.toml"));
        }
    }

    let home = env::var("HOME").map_err(|_| {
        "Cannot resolve config path: set QR_CONFIG or HOME/XDG_CONFIG_HOME.".to_string()
    })?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("qroute")
        .join("config.toml"))
}

/// Reads the store; a missing file is an empty store, not an error.
pub fn load_store() -> Result<CredentialStore, String> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(CredentialStore::default());
    }

    let raw = fs::read_to_string(&path)
        .map_err(|err| format!("Failed to read config file '{}': {err}", path.display()))?;
    toml::from_str(&raw)
        .map_err(|err| format!("Failed to parse config file '{}': {err}", path.display()))
}

/// Persists the store, creating parent directories as needed.
pub fn save_store(store: &CredentialStore) -> Result<PathBuf, String> {
    let path = config_path()?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|err| {
            format!(
                "Failed to create config directory '{}': {err}",
                parent.display()
            )
        })?;
    }

    let body = toml::to_string_pretty(store)
        .map_err(|err| format!("Failed to serialize config: {err}"))?;
    fs::write(&path, body)
        .map_err(|err| format!("Failed to write config file '{}': {err}", path.display()))?;
    Ok(path)
}

/// Deletes the store file if present.
pub fn clear_store() -> Result<PathBuf, String> {
    let path = config_path()?;
    if path.exists() {
        fs::remove_file(&path)
            .map_err(|err| format!("Failed to remove config file '{}': {err}", path.display()))?;
    }
    Ok(path)
}

/// Builds the process-wide registry snapshot: stored credentials with
/// environment-variable overrides on top.
pub fn load_registry() -> Result<ProviderRegistry, String> {
    let store = load_store()?;
    let mut credentials = Vec::new();
    for provider in Provider::ALL {
        let value = env::var(provider.api_key_env())
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .or_else(|| store.get(provider).map(str::to_string));
        if let Some(value) = value {
            credentials.push((provider, value));
        }
    }

    let mut registry = ProviderRegistry::new();
    registry.configure(credentials);
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::CredentialStore;
    use crate::dispatch::registry::Provider;

    #[test]
    fn store_round_trips_through_toml() {
        let mut store = CredentialStore::default();
        store.set(Provider::Weather, "weather-key-1");
        store.set(Provider::LanguageModel, "langchain-key-1");
        store.api_configured = true;

        let body = toml::to_string_pretty(&store).expect("store should serialize");
        assert!(body.contains("weather_api_key"));
        assert!(body.contains("langchain_api_key"));
        assert!(body.contains("api_configured = true"));
        assert!(!body.contains("google_api_key"));

        let parsed: CredentialStore = toml::from_str(&body).expect("store should parse");
        assert_eq!(parsed, store);
    }

    #[test]
    fn missing_keys_parse_as_unset() {
        let parsed: CredentialStore =
            toml::from_str("api_configured = false\n").expect("minimal store should parse");
        assert_eq!(parsed.get(Provider::Weather), None);
        assert_eq!(parsed.get(Provider::Search), None);
        assert!(!parsed.api_configured);
    }

    #[test]
    fn empty_credential_reads_as_unset() {
        let mut store = CredentialStore::default();
        store.set(Provider::Weather, "weather-key-1");
        store.set(Provider::Weather, "");
        assert_eq!(store.get(Provider::Weather), None);
    }

    #[test]
    fn storage_keys_match_the_persisted_names() {
        assert_eq!(Provider::Weather.storage_key(), "weather_api_key");
        assert_eq!(Provider::Search.storage_key(), "google_api_key");
        assert_eq!(Provider::LanguageModel.storage_key(), "langchain_api_key");
    }
}
