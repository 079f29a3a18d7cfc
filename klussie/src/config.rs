//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `KLUSSIE_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `KLUSSIE_` override YAML values
//! 3. **Webhook URLs** - `CONTACT_URL`, `GPT_URL` and `HANDYMAN_URL` override `relay.*_url`
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `KLUSSIE_RELAY__TIMEOUT=10s` sets the `relay.timeout` field.
//!
//! ## Usage
//!
//! ```no_run
//! use clap::Parser;
//! use klussie::config::{Args, Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let args = Args::parse();
//! let config = Config::load(&args)?;
//!
//! println!("Server will bind to {}:{}", config.host, config.port);
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration Structure
//!
//! - **Server**: `host`, `port` - HTTP server binding configuration
//! - **Site**: `default_language`, `site.*` - Brand name and public contact details shown on pages
//! - **Relay**: `relay.*_url`, `relay.timeout` - External webhook destinations
//! - **Uploads**: `uploads.max_file_size`, `uploads.max_body_size` - Image upload limits
//! - **CORS**: `cors.*` - Origins allowed to call the JSON API from a browser
//! - **Telemetry**: `log_format`, `enable_otel_export`
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! # Override server port
//! KLUSSIE_PORT=8080
//!
//! # Webhook destinations
//! CONTACT_URL="https://hooks.example.com/contact"
//! GPT_URL="https://hooks.example.com/job-request"
//! HANDYMAN_URL="https://hooks.example.com/handyman"
//!
//! # Override nested values
//! KLUSSIE_UPLOADS__MAX_FILE_SIZE=2097152
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::errors::Error;
use crate::i18n::Language;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "KLUSSIE_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// All fields have defaults, so an empty (or missing) config file yields a runnable server that
/// rejects every submission until webhook URLs are configured.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Language used when neither `?lang=` nor the `lang` cookie picks one
    pub default_language: Language,
    /// Public details rendered on the pages
    pub site: SiteConfig,
    /// External webhook destinations
    pub relay: RelayConfig,
    /// Limits for uploaded images
    pub uploads: UploadConfig,
    /// CORS configuration for the JSON API
    pub cors: CorsConfig,
    /// Console log output format
    pub log_format: LogFormat,
    /// Enable OpenTelemetry OTLP export for distributed tracing
    pub enable_otel_export: bool,
}

/// Brand and contact details shown in page headers, footers and the contact page.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub name: String,
    pub contact_email: String,
    pub contact_phone: String,
}

/// Webhook destinations for the three submission kinds.
///
/// A destination without a URL fails closed: submissions to it return a generic 500.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelayConfig {
    pub contact_url: Option<Url>,
    pub gpt_url: Option<Url>,
    pub handyman_url: Option<Url>,
    /// Timeout for a single webhook delivery
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadConfig {
    /// Largest accepted image, in bytes. Larger files are dropped from the selection.
    pub max_file_size: u64,
    /// Largest accepted request body, in bytes
    pub max_body_size: usize,
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins for CORS requests
    pub allowed_origins: Vec<CorsOrigin>,
    /// Cache preflight requests for this many seconds
    pub max_age: Option<u64>,
}

/// CORS origin specification.
///
/// Can be either a wildcard (`*`) to allow all origins, or a specific URL.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CorsOrigin {
    /// Allow all origins (`*`)
    #[serde(deserialize_with = "parse_wildcard")]
    Wildcard,
    /// Specific origin URL (e.g., `https://klussie.nl`)
    #[serde(deserialize_with = "parse_url")]
    Url(Url),
}

fn parse_wildcard<'de, D>(deserializer: D) -> Result<(), D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    if s == "*" {
        Ok(())
    } else {
        Err(serde::de::Error::custom("Expected '*'"))
    }
}

fn parse_url<'de, D>(deserializer: D) -> Result<Url, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    Url::parse(&s).map_err(serde::de::Error::custom)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            default_language: Language::default(),
            site: SiteConfig::default(),
            relay: RelayConfig::default(),
            uploads: UploadConfig::default(),
            cors: CorsConfig::default(),
            log_format: LogFormat::default(),
            enable_otel_export: false,
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "Klussie".to_string(),
            contact_email: "info@klussie.nl".to_string(),
            contact_phone: "+31 20 123 4567".to_string(),
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            contact_url: None,
            gpt_url: None,
            handyman_url: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: 5 * 1024 * 1024,
            max_body_size: 64 * 1024 * 1024,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![CorsOrigin::Wildcard],
            max_age: Some(3600),
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency
    pub fn validate(&self) -> Result<(), Error> {
        if self.uploads.max_file_size == 0 {
            return Err(Error::Internal {
                operation: "Config validation: uploads.max_file_size cannot be 0".to_string(),
            });
        }

        if self.uploads.max_file_size > self.uploads.max_body_size as u64 {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: uploads.max_file_size ({}) cannot be greater than uploads.max_body_size ({})",
                    self.uploads.max_file_size, self.uploads.max_body_size
                ),
            });
        }

        if self.relay.timeout.is_zero() {
            return Err(Error::Internal {
                operation: "Config validation: relay.timeout cannot be 0".to_string(),
            });
        }

        for (key, url) in self.relay.urls() {
            match url {
                Some(url) if !matches!(url.scheme(), "http" | "https") => {
                    return Err(Error::Internal {
                        operation: format!("Config validation: relay.{key} must be an http(s) URL, got scheme '{}'", url.scheme()),
                    });
                }
                Some(_) => {}
                None => {
                    tracing::warn!("relay.{key} is not configured; submissions to it will be rejected");
                }
            }
        }

        if self.cors.allowed_origins.is_empty() {
            return Err(Error::Internal {
                operation: "Config validation: CORS allowed_origins cannot be empty. Add at least one allowed origin.".to_string(),
            });
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can still override specific values
            .merge(Env::prefixed("KLUSSIE_").ignore(&["CONFIG"]).split("__"))
            // Bare webhook variables, as used by most hosting dashboards
            .merge(
                Env::raw()
                    .only(&["CONTACT_URL", "GPT_URL", "HANDYMAN_URL"])
                    .map(|key| format!("relay.{}", key.as_str().to_ascii_lowercase()).into()),
            )
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl RelayConfig {
    fn urls(&self) -> [(&'static str, Option<&Url>); 3] {
        [
            ("contact_url", self.contact_url.as_ref()),
            ("gpt_url", self.gpt_url.as_ref()),
            ("handyman_url", self.handyman_url.as_ref()),
        ]
    }
}
