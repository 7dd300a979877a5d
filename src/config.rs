//! Configuration management for `TripCreator`
//!
//! Handles loading configuration from files and environment variables
//! and provides validation for all configuration settings.

use crate::TripCreatorError;
use crate::http::worst_case_seconds;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `TripCreator` application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TripCreatorConfig {
    /// Itinerary generator (chat completion) settings
    #[serde(default)]
    pub generator: GeneratorConfig,
    /// Image search settings
    #[serde(default)]
    pub images: ImageSearchConfig,
    /// Geocoding settings
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    /// Enrichment settings
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Chat-completion API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// API key, falls back to `OPENAI_API_KEY`
    pub api_key: Option<String>,
    #[serde(default = "default_generator_base_url")]
    pub base_url: String,
    #[serde(default = "default_generator_model")]
    pub model: String,
    #[serde(default = "default_generator_temperature")]
    pub temperature: f32,
    /// Request timeout in seconds
    #[serde(default = "default_generator_timeout")]
    pub timeout_seconds: u32,
    /// Retries for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Image search API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSearchConfig {
    /// API key, falls back to `GOOGLE_API_KEY`
    pub api_key: Option<String>,
    /// Custom search engine id, falls back to `GOOGLE_CSE_ID`
    pub search_engine_id: Option<String>,
    #[serde(default = "default_google_base_url")]
    pub base_url: String,
    /// Number of candidates requested per query
    #[serde(default = "default_image_candidates")]
    pub candidates: u32,
    /// Hosts whose images are never accepted
    #[serde(default = "default_excluded_domains")]
    pub excluded_domains: Vec<String>,
    #[serde(default = "default_lookup_timeout")]
    pub timeout_seconds: u32,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Geocoding API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// API key, falls back to `GOOGLE_MAPS_API_KEY`
    pub api_key: Option<String>,
    #[serde(default = "default_maps_base_url")]
    pub base_url: String,
    #[serde(default = "default_lookup_timeout")]
    pub timeout_seconds: u32,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Enrichment settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Upper bound for a single image or geocode lookup, in seconds
    #[serde(default = "default_lookup_timeout")]
    pub lookup_timeout_seconds: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// OTLP/HTTP endpoint for trace export, disabled when unset
    pub otlp_endpoint: Option<String>,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Directory with the built frontend, served when it exists
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    /// Whole-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u32,
}

// Default value functions
fn default_generator_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_generator_model() -> String {
    "gpt-4".to_string()
}

fn default_generator_temperature() -> f32 {
    0.7
}

fn default_generator_timeout() -> u32 {
    120
}

fn default_max_retries() -> u32 {
    2
}

fn default_google_base_url() -> String {
    "https://www.googleapis.com".to_string()
}

fn default_maps_base_url() -> String {
    "https://maps.googleapis.com".to_string()
}

fn default_image_candidates() -> u32 {
    5
}

fn default_excluded_domains() -> Vec<String> {
    vec!["lookaside.fbsbx.com".to_string()]
}

fn default_lookup_timeout() -> u32 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_static_dir() -> String {
    "frontend/dist".to_string()
}

fn default_request_timeout() -> u32 {
    420
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_generator_base_url(),
            model: default_generator_model(),
            temperature: default_generator_temperature(),
            timeout_seconds: default_generator_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for ImageSearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            search_engine_id: None,
            base_url: default_google_base_url(),
            candidates: default_image_candidates(),
            excluded_domains: default_excluded_domains(),
            timeout_seconds: default_lookup_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_maps_base_url(),
            timeout_seconds: default_lookup_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            lookup_timeout_seconds: default_lookup_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            otlp_endpoint: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            static_dir: default_static_dir(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl TripCreatorConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        let path = std::env::var_os("TRIPCREATOR_CONFIG").map(PathBuf::from);
        Self::load_from_path(path)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // TRIPCREATOR_GENERATOR__MODEL=gpt-4o overrides generator.model
        builder = builder.add_source(
            Environment::with_prefix("TRIPCREATOR")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("images.excluded_domains")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TripCreatorConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_env_credentials(|name| std::env::var(name).ok());
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tripcreator").join("config.toml"))
    }

    /// Fill credentials that are not set in the config from the conventional
    /// provider variables.
    pub fn apply_env_credentials<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.generator.api_key.is_none() {
            self.generator.api_key = lookup("OPENAI_API_KEY");
        }
        if self.images.api_key.is_none() {
            self.images.api_key = lookup("GOOGLE_API_KEY");
        }
        if self.images.search_engine_id.is_none() {
            self.images.search_engine_id = lookup("GOOGLE_CSE_ID");
        }
        if self.geocoding.api_key.is_none() {
            self.geocoding.api_key = lookup("GOOGLE_MAPS_API_KEY");
        }
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.generator.base_url.is_empty() {
            self.generator.base_url = default_generator_base_url();
        }
        if self.generator.model.is_empty() {
            self.generator.model = default_generator_model();
        }
        if self.generator.timeout_seconds == 0 {
            self.generator.timeout_seconds = default_generator_timeout();
        }
        if self.images.base_url.is_empty() {
            self.images.base_url = default_google_base_url();
        }
        if self.images.candidates == 0 {
            self.images.candidates = default_image_candidates();
        }
        if self.images.timeout_seconds == 0 {
            self.images.timeout_seconds = default_lookup_timeout();
        }
        if self.geocoding.base_url.is_empty() {
            self.geocoding.base_url = default_maps_base_url();
        }
        if self.geocoding.timeout_seconds == 0 {
            self.geocoding.timeout_seconds = default_lookup_timeout();
        }
        if self.enrichment.lookup_timeout_seconds == 0 {
            self.enrichment.lookup_timeout_seconds = default_lookup_timeout();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.server.port == 0 {
            self.server.port = default_server_port();
        }
        if self.server.request_timeout_seconds == 0 {
            self.server.request_timeout_seconds = default_request_timeout();
        }
        // Blank credentials count as absent
        for key in [
            &mut self.generator.api_key,
            &mut self.images.api_key,
            &mut self.images.search_engine_id,
            &mut self.geocoding.api_key,
        ] {
            if key.as_deref().is_some_and(|k| k.trim().is_empty()) {
                *key = None;
            }
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.generator.temperature) {
            return Err(
                TripCreatorError::config("Generator temperature must be between 0 and 2").into(),
            );
        }

        if self.generator.timeout_seconds > 600 {
            return Err(
                TripCreatorError::config("Generator timeout cannot exceed 600 seconds").into(),
            );
        }

        for (name, retries) in [
            ("Generator", self.generator.max_retries),
            ("Image search", self.images.max_retries),
            ("Geocoding", self.geocoding.max_retries),
        ] {
            if retries > 10 {
                return Err(TripCreatorError::config(format!(
                    "{name} max retries cannot exceed 10"
                ))
                .into());
            }
        }

        if !(1..=10).contains(&self.images.candidates) {
            return Err(TripCreatorError::config(
                "Image search candidates must be between 1 and 10",
            )
            .into());
        }

        // a slow generator must surface as its own error, not a server timeout
        let generation_budget =
            worst_case_seconds(self.generator.timeout_seconds, self.generator.max_retries);
        if u64::from(self.server.request_timeout_seconds) < generation_budget {
            return Err(TripCreatorError::config(format!(
                "Server request timeout ({}s) must cover the generator's worst case of {}s \
                 (timeout x attempts plus retry backoff)",
                self.server.request_timeout_seconds, generation_budget
            ))
            .into());
        }

        if self.enrichment.lookup_timeout_seconds > 120 {
            return Err(
                TripCreatorError::config("Lookup timeout cannot exceed 120 seconds").into(),
            );
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TripCreatorError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TripCreatorError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Generator", &self.generator.base_url),
            ("Image search", &self.images.base_url),
            ("Geocoding", &self.geocoding.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(TripCreatorError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}
