use clap::{Args, Subcommand};

use crate::config;
use crate::dispatch::registry::Provider;

#[derive(Debug, Args, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Debug, Subcommand, Clone)]
enum ConfigSubcommand {
    /// Save provider credentials; an empty value clears that provider
    Set {
        /// OpenWeatherMap API key
        #[arg(long, value_name = "KEY")]
        weather: Option<String>,
        /// Google API key
        #[arg(long, value_name = "KEY")]
        search: Option<String>,
        /// LangChain/LangGraph API key
        #[arg(long, value_name = "KEY")]
        language_model: Option<String>,
    },
    /// Show configured providers with masked credentials
    Show,
    /// Delete the stored credentials
    Clear,
    /// Validate the stored credential file
    Check,
}

pub fn run(args: ConfigArgs) -> Result<(), String> {
    match args.command {
        ConfigSubcommand::Set {
            weather,
            search,
            language_model,
        } => {
            if weather.is_none() && search.is_none() && language_model.is_none() {
                return Err(
                    "No credentials provided. Pass --weather, --search, or --language-model."
                        .to_string(),
                );
            }

            let mut store = config::load_store()?;
            if let Some(value) = weather {
                store.set(Provider::Weather, value.trim());
            }
            if let Some(value) = search {
                store.set(Provider::Search, value.trim());
            }
            if let Some(value) = language_model {
                store.set(Provider::LanguageModel, value.trim());
            }
            store.api_configured = true;

            let path = config::save_store(&store)?;
            println!("credentials saved: {}", path.display());
            Ok(())
        }
        ConfigSubcommand::Show => {
            let store = config::load_store()?;
            for provider in Provider::ALL {
                match store.get(provider) {
                    Some(credential) => {
                        println!("{}: {}", provider.as_str(), mask(credential));
                    }
                    None => println!("{}: not set", provider.as_str()),
                }
            }
            println!("api_configured: {}", store.api_configured);
            Ok(())
        }
        ConfigSubcommand::Clear => {
            let path = config::clear_store()?;
            println!("configuration cleared: {}", path.display());
            Ok(())
        }
        ConfigSubcommand::Check => {
            let store = config::load_store()?;
            let path = config::config_path()?;
            if path.exists() {
                println!("config OK: {}", path.display());
            } else {
                println!("config OK: {} (not created yet)", path.display());
            }

            let configured: Vec<&str> = Provider::ALL
                .into_iter()
                .filter(|provider| store.get(*provider).is_some())
                .map(Provider::as_str)
                .collect();
            if configured.is_empty() {
                println!("configured providers: none");
            } else {
                println!("configured providers: {}", configured.join(", "));
            }
            Ok(())
        }
    }
}

/// At most the first four characters; the rest never leaves the store.
fn mask(credential: &str) -> String {
    let visible: String = credential.chars().take(4).collect();
    format!("{visible}...")
}
