use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use owo_colors::OwoColorize;
use serde_json::json;

use crate::config;
use crate::dispatch::dispatcher::{self, Route};
use crate::dispatch::registry::{Provider, ProviderRegistry};
use crate::dispatch::response::QueryResponse;
use crate::dispatch::weather::WeatherClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    Text,
    Json,
}

impl OutputMode {
    fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct AskArgs {
    /// Free-text query; read from stdin when omitted.
    pub query: Option<String>,

    /// Output format.
    #[arg(long, value_enum)]
    pub output: Option<OutputMode>,

    /// Shorthand for --output json; wins when both are given.
    #[arg(long)]
    pub json: bool,

    /// Plan the route and print it without calling any provider.
    #[arg(long)]
    pub dry_run: bool,

    /// Also write the JSON response to this file.
    #[arg(long, value_name = "PATH")]
    pub save: Option<PathBuf>,

    /// Diagnostic logging on stderr.
    #[arg(long)]
    pub verbose: bool,

    /// Suppress non-fatal stderr output and the step trace.
    #[arg(long)]
    pub quiet: bool,

    /// Print version and build metadata.
    #[arg(long)]
    pub version: bool,
}

pub async fn run(args: AskArgs) -> Result<(), String> {
    if args.version {
        println!(
            "qroute {} (commit: {}, built: {})",
            env!("CARGO_PKG_VERSION"),
            env!("QR_GIT_SHA"),
            env!("QR_BUILD_TS"),
        );
        return Ok(());
    }

    let verbose = args.verbose && !args.quiet;
    let output = resolve_output(&args);
    let query = resolve_query(args.query.as_deref())?;
    let registry = config::load_registry()?;

    if verbose {
        let names: Vec<&str> = registry
            .configured()
            .into_iter()
            .map(Provider::as_str)
            .collect();
        eprintln!("configured=[{}]", names.join(","));
    }

    let route = dispatcher::plan(&query, &registry);
    if verbose {
        match &route {
            Route::Weather { location } => {
                eprintln!("route=weather location={location} credential_present=true");
            }
            other => eprintln!("route={}", other.as_str()),
        }
    }

    if args.dry_run {
        let body = dry_run_body(&query, &route, &registry, output);
        let rendered = serde_json::to_string(&body)
            .map_err(|err| format!("Failed to serialize dry-run plan: {err}"))?;
        println!("{rendered}");
        return Ok(());
    }

    let weather = WeatherClient::from_env();
    let response = dispatcher::dispatch(&query, &registry, &weather).await;

    if let Some(path) = &args.save {
        save_response(path, &response)?;
    }

    match output {
        OutputMode::Json => {
            let rendered = serde_json::to_string(&response)
                .map_err(|err| format!("Failed to serialize response: {err}"))?;
            println!("{rendered}");
        }
        OutputMode::Text => render_text(&response, args.quiet),
    }

    if let Some(detail) = &response.error
        && !args.quiet
    {
        eprintln!("error: {detail}");
    }

    Ok(())
}

fn resolve_output(args: &AskArgs) -> OutputMode {
    if args.json {
        return OutputMode::Json;
    }
    args.output.unwrap_or(OutputMode::Text)
}

/// The argument wins over stdin; stdin is only read when no argument is
/// given.
fn resolve_query(arg: Option<&str>) -> Result<String, String> {
    if let Some(query) = arg {
        let trimmed = query.trim();
        if !trimmed.is_empty() {
            return Ok(trimmed.to_string());
        }
    } else {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|err| format!("Failed to read query from stdin: {err}"))?;
        let trimmed = buffer.trim();
        if !trimmed.is_empty() {
            return Ok(trimmed.to_string());
        }
    }
    Err("No query provided. Pass a query argument or pipe one on stdin.".to_string())
}

fn dry_run_body(
    query: &str,
    route: &Route,
    registry: &ProviderRegistry,
    output: OutputMode,
) -> serde_json::Value {
    let configured: Vec<&str> = registry
        .configured()
        .into_iter()
        .map(Provider::as_str)
        .collect();
    let mut body = json!({
        "dry_run": true,
        "query": query,
        "route": route.as_str(),
        "configured": configured,
        "output": output.as_str(),
    });
    if let Route::Weather { location } = route {
        body["location"] = json!(location);
    }
    body
}

fn save_response(path: &Path, response: &QueryResponse) -> Result<(), String> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|err| {
            format!(
                "Failed to create output directory '{}': {err}",
                parent.display()
            )
        })?;
    }
    let body = serde_json::to_string(response)
        .map_err(|err| format!("Failed to serialize response: {err}"))?;
    fs::write(path, body)
        .map_err(|err| format!("Failed to write output file '{}': {err}", path.display()))
}

fn render_text(response: &QueryResponse, quiet: bool) {
    println!("{}", response.answer);
    if quiet || response.steps.is_empty() {
        return;
    }
    println!();
    println!("{}", "Steps:".bold());
    for (index, step) in response.steps.iter().enumerate() {
        println!("  {}. {}: {}", index + 1, step.label.cyan(), step.description);
    }
}

#[cfg(test)]
mod tests {
    use super::{AskArgs, OutputMode, dry_run_body, resolve_output};
    use crate::dispatch::dispatcher::Route;
    use crate::dispatch::registry::{Provider, ProviderRegistry};

    fn args(json: bool, output: Option<OutputMode>) -> AskArgs {
        AskArgs {
            query: None,
            output,
            json,
            dry_run: false,
            save: None,
            verbose: false,
            quiet: false,
            version: false,
        }
    }

    #[test]
    fn json_flag_wins_over_output() {
        assert_eq!(
            resolve_output(&args(true, Some(OutputMode::Text))),
            OutputMode::Json
        );
        assert_eq!(
            resolve_output(&args(false, Some(OutputMode::Json))),
            OutputMode::Json
        );
        assert_eq!(resolve_output(&args(false, None)), OutputMode::Text);
    }

    #[test]
    fn dry_run_body_carries_the_weather_location() {
        let mut registry = ProviderRegistry::new();
        registry.configure(vec![(Provider::Weather, "weather-key".to_string())]);

        let body = dry_run_body(
            "weather in Paris",
            &Route::Weather {
                location: "Paris".to_string(),
            },
            &registry,
            OutputMode::Text,
        );
        assert_eq!(body["route"], "weather");
        assert_eq!(body["location"], "Paris");
        assert_eq!(body["configured"][0], "weather");
    }

    #[test]
    fn dry_run_body_omits_location_off_the_weather_route() {
        let registry = ProviderRegistry::new();
        let body = dry_run_body("hello", &Route::Unconfigured, &registry, OutputMode::Json);
        assert_eq!(body["route"], "unconfigured");
        assert!(body.get("location").is_none());
        assert_eq!(body["output"], "json");
    }
}
