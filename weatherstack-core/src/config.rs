use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::{
    fmt, fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Environment variable holding the service base URL, e.g. `http://api.weatherstack.com/`.
pub const BASE_URL_VAR: &str = "BASE_URL";

/// Environment variable holding the Weatherstack access key.
pub const API_KEY_VAR: &str = "WEATHERSTACK_API_KEY";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error(
        "Missing configuration value '{0}'.\n\
         Hint: export {0}, add it to a .env file, or run `weatherstack configure`."
    )]
    Missing(&'static str),

    #[error("Invalid base URL '{value}': {reason}")]
    InvalidBaseUrl { value: String, reason: String },
}

/// Resolved, immutable settings handed to the client.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    base_url: Url,
    api_key: String,
}

impl Settings {
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, SettingsError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(SettingsError::Missing(API_KEY_VAR));
        }

        let base_url = Url::parse(base_url.trim()).map_err(|e| SettingsError::InvalidBaseUrl {
            value: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { base_url, api_key })
    }

    /// Resolve settings through an arbitrary key lookup. Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(SettingsError::Missing(key))
        };

        let base_url = get(BASE_URL_VAR)?;
        let api_key = get(API_KEY_VAR)?;

        Self::new(&base_url, api_key)
    }

    /// Load settings for this process: `.env` first, then the settings file,
    /// with environment variables taking precedence over the file.
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let file = SettingsFile::load()?;
        let settings = Self::from_sources(|key| std::env::var(key).ok(), &file)?;

        Ok(settings)
    }

    /// Layer an environment lookup over the settings file. An unset or empty
    /// environment value falls back to the file.
    pub fn from_sources<F>(env: F, file: &SettingsFile) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_lookup(|key| {
            env(key)
                .filter(|v| !v.trim().is_empty())
                .or_else(|| file.get(key))
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Copy of these settings carrying a different access key.
    pub fn with_api_key(&self, api_key: impl Into<String>) -> Self {
        Self { base_url: self.base_url.clone(), api_key: api_key.into() }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &mask_secret(&self.api_key))
            .finish()
    }
}

/// Keep the first four characters of a secret, star out the rest.
pub fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    let hidden = secret.chars().count().saturating_sub(4);
    format!("{visible}{}", "*".repeat(hidden))
}

/// Optional on-disk settings, written by `weatherstack configure`.
///
/// Example TOML:
/// base_url = "http://api.weatherstack.com/"
/// api_key = "..."
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SettingsFile {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

impl SettingsFile {
    /// Load the settings file, or return an empty one if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save the settings file, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory: {}", parent.display())
            })?;
        }

        let toml = toml::to_string_pretty(self).context("Failed to serialize settings to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write settings file: {}", path.display()))?;

        Ok(())
    }

    pub fn path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("com", "weatherstack", "weatherstack-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Value for an environment variable name, if the file sets it.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            BASE_URL_VAR => self.base_url.clone(),
            API_KEY_VAR => self.api_key.clone(),
            _ => None,
        }
    }
}
