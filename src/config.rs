use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::core::normalizer::{AliasTable, AliasTableError};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub extraction: ExtractionSettings,
    #[serde(default)]
    pub normalizer: NormalizerSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionSettings {
    #[serde(default = "default_extraction_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_extraction_model")]
    pub model: String,
    /// Extraction is disabled when no key is configured
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            endpoint: default_extraction_endpoint(),
            model: default_extraction_model(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_extraction_endpoint() -> String { "https://generativelanguage.googleapis.com".to_string() }
fn default_extraction_model() -> String { "gemini-2.5-flash".to_string() }
fn default_timeout_secs() -> u64 { 60 }
fn default_max_retries() -> u32 { 3 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NormalizerSettings {
    /// TOML file with an `[aliases]` table
    pub alias_file: Option<String>,
    /// Inline `canonical -> [variants]` groups, merged over the file
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<String>>,
}

impl NormalizerSettings {
    /// Build the process-wide alias table
    pub fn load_aliases(&self) -> Result<Arc<AliasTable>, AliasTableError> {
        let table = match &self.alias_file {
            Some(path) => AliasTable::load(path)?,
            None => AliasTable::empty(),
        };
        let table = if self.aliases.is_empty() {
            table
        } else {
            table.merged_with(self.aliases.clone())?
        };
        Ok(Arc::new(table))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputSettings {
    /// Directory for persisted reports; nothing is written when unset
    pub dir: Option<String>,
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with CVMATCH__)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., CVMATCH__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("CVMATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings = apply_api_key_override(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("CVMATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings = apply_api_key_override(settings)?;

        settings.try_deserialize()
    }
}

/// Take the extraction key from the conventional Google variables when set
fn apply_api_key_override(settings: Config) -> Result<Config, ConfigError> {
    let api_key = std::env::var("GEMINI_API_KEY")
        .or_else(|_| std::env::var("GOOGLE_API_KEY"))
        .ok()
        .filter(|key| !key.is_empty());

    match api_key {
        Some(key) => Config::builder()
            .add_source(settings)
            .set_override("extraction.api_key", key)?
            .build(),
        None => Ok(settings),
    }
}
