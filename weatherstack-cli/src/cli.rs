use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use inquire::{Password, Text};
use tracing::debug;
use weatherstack_core::{
    CurrentWeatherRequest, CurrentWeatherSummary, ErrorPayload, Scenario, Schema, Settings,
    SettingsFile, Units, WeatherstackClient, assertions,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherstack", version, about = "Weatherstack API contract checks")]
pub struct Cli {
    /// Log every request and assertion at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store base URL and access key in the settings file.
    Configure,

    /// Request current weather for a location.
    Current {
        /// Location query: city name, zip code, IP address, ...
        query: String,

        /// m (metric), s (scientific) or f (fahrenheit).
        #[arg(long, value_parser = parse_units)]
        units: Option<Units>,

        /// Response language, e.g. "de".
        #[arg(long)]
        language: Option<String>,

        /// Print the raw JSON body instead of a summary.
        #[arg(long)]
        raw: bool,
    },

    /// Run the scenario catalogue against the live service.
    Check {
        /// Only run scenarios whose name contains this text.
        #[arg(long)]
        filter: Option<String>,
    },
}

fn parse_units(value: &str) -> Result<Units> {
    Units::try_from(value)
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Current { query, units, language, raw } => {
                let mut request = CurrentWeatherRequest::new(query);
                request.units = units;
                request.language = language;
                current(&request, raw).await
            }
            Command::Check { filter } => check(filter.as_deref()).await,
        }
    }
}

fn connect() -> Result<WeatherstackClient> {
    let settings = Settings::load()?;
    debug!(?settings, "Loaded settings");
    Ok(WeatherstackClient::new(settings))
}

fn configure() -> Result<()> {
    let mut file = SettingsFile::load()?;

    let base_url = Text::new("Base URL:")
        .with_default(file.base_url.as_deref().unwrap_or("http://api.weatherstack.com/"))
        .prompt()
        .context("Failed to read base URL")?;

    let api_key = Password::new("Access key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read access key")?;

    // Reject values the client would refuse later.
    Settings::new(&base_url, api_key.clone())?;

    file.base_url = Some(base_url);
    file.api_key = Some(api_key);
    let path = file.save()?;

    println!("Settings saved to {}", path.display());
    Ok(())
}

async fn current(request: &CurrentWeatherRequest, raw: bool) -> Result<()> {
    let client = connect()?;
    let response = client.get_current_weather(request).await?;

    println!("HTTP {}", response.status_code());

    let body = response.json()?;
    if raw {
        println!("{}", serde_json::to_string_pretty(&body)?);
    }

    if assertions::validate_schema(&body, Schema::CurrentWeather).is_ok() {
        if !raw {
            println!("{}", CurrentWeatherSummary::from_json(&body)?);
        }
        println!("Body conforms to the {} schema.", Schema::CurrentWeather);
        return Ok(());
    }

    match assertions::validate_schema(&body, Schema::Error) {
        Ok(()) => {
            let payload: ErrorPayload = serde_json::from_value(body)?;
            if !raw {
                println!("Error {}: {}", payload.error.code, payload.error.info);
            }
            println!("Body conforms to the {} schema.", Schema::Error);
            Ok(())
        }
        Err(err) => Err(anyhow!("Body matches neither schema: {err}")),
    }
}

async fn check(filter: Option<&str>) -> Result<()> {
    let client = connect()?;

    let scenarios: Vec<Scenario> = Scenario::all()
        .into_iter()
        .filter(|s| filter.is_none_or(|f| s.name().contains(f)))
        .collect();

    if scenarios.is_empty() {
        return Err(anyhow!("No scenario matches the filter."));
    }

    let mut failed = 0;
    for scenario in &scenarios {
        match scenario.run(&client).await {
            Ok(()) => println!("PASS {scenario}"),
            Err(err) => {
                failed += 1;
                println!("FAIL {scenario}\n     {err}");
            }
        }
    }

    println!("\n{} passed, {} failed", scenarios.len() - failed, failed);

    if failed > 0 {
        return Err(anyhow!("{failed} scenario(s) failed"));
    }
    Ok(())
}
