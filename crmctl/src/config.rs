//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable
//! overrides. The configuration file path defaults to `config.yaml` but can
//! be specified via the `-f` flag or the `CRMCTL_CONFIG` environment
//! variable.
//!
//! ## Loading Priority
//!
//! Sources are merged in order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `CRMCTL_`
//!
//! For nested values, use double underscores in environment variables. For
//! example, `CRMCTL_API__BASE_URL=http://crm.internal:3000` sets the
//! `api.base_url` field.
//!
//! ```bash
//! # Point the console at a different backend
//! CRMCTL_API__BASE_URL="https://crm.example.com"
//!
//! # Shorten the request timeout
//! CRMCTL_API__TIMEOUT="3s"
//!
//! # Relocate the session file
//! CRMCTL_STORAGE__PATH="/tmp/crmctl-session.json"
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::errors::Error;

/// Simple CLI args - config file selection and validation.
#[derive(Parser, Debug)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "CRMCTL_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without running a command.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// All fields have sensible defaults, so the console runs against a local
/// backend with no configuration file at all.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Backend API settings
    pub api: ApiConfig,
    /// Durable session storage settings
    pub storage: StorageConfig,
    /// List engine defaults
    pub list: ListConfig,
}

/// Backend API settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL of the CRM backend (e.g. "http://localhost:3000")
    pub base_url: Url,
    /// Request timeout, human-readable (e.g. "10s", "1500ms")
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".parse().expect("default base URL is valid"),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Durable session storage settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Path of the JSON session file
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".crmctl/session.json"),
        }
    }
}

/// List engine defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListConfig {
    /// Default number of items per page
    pub default_page_size: usize,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self { default_page_size: 10 }
    }
}

impl Config {
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can still override specific values
            .merge(Env::prefixed("CRMCTL_").split("__"))
    }

    /// Validate the configuration for consistency and required fields.
    pub fn validate(&self) -> Result<(), Error> {
        match self.api.base_url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(Error::Internal {
                    operation: format!("Config validation: api.base_url must be http or https, got {other:?}"),
                });
            }
        }

        if self.api.timeout.is_zero() {
            return Err(Error::Internal {
                operation: "Config validation: api.timeout must be positive".to_string(),
            });
        }

        if self.list.default_page_size == 0 {
            return Err(Error::Internal {
                operation: "Config validation: list.default_page_size must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}
