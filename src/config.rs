//! Configuration loading and validation

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub currency: CurrencyConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Which deployment variant of the wallet backend this client talks to.
///
/// The fiat variant withdraws decimal USD against a linked bank account; the
/// diamond variant withdraws whole diamond units against a connected
/// payment-processor account and additionally supports coin conversion.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CurrencyVariant {
    Fiat,
    Diamond,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrencyConfig {
    #[serde(default = "default_variant")]
    pub variant: CurrencyVariant,
    /// Display label appended to balances and amounts ("USD", "diamonds")
    #[serde(default = "default_label")]
    pub label: String,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            variant: default_variant(),
            label: default_label(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Durable location of the persisted session token
    #[serde(default = "default_token_path")]
    pub token_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            token_path: default_token_path(),
        }
    }
}

// Default value functions
fn default_base_url() -> String {
    std::env::var("PAYOUT_API_BASE_URL").unwrap_or_else(|_| "https://api.example.com".into())
}

fn default_timeout_ms() -> u64 {
    10000
}

fn default_variant() -> CurrencyVariant {
    CurrencyVariant::Fiat
}

fn default_label() -> String {
    "USD".to_string()
}

fn default_token_path() -> String {
    ".payout/authToken".to_string()
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let settings = config::Config::builder()
            // Start with defaults
            .set_default("api.base_url", default_base_url())?
            .set_default("api.timeout_ms", default_timeout_ms() as i64)?
            // Load from file if exists
            .add_source(config::File::from(path).required(false))
            // Override with environment variables (prefix PAYOUT_)
            .add_source(
                config::Environment::with_prefix("PAYOUT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: Config = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.api.base_url.is_empty() {
            anyhow::bail!("api.base_url must not be empty");
        }

        url::Url::parse(&self.api.base_url)
            .with_context(|| format!("Invalid api.base_url: {}", self.api.base_url))?;

        if self.api.timeout_ms == 0 {
            anyhow::bail!("api.timeout_ms must be positive");
        }

        if self.currency.label.is_empty() {
            anyhow::bail!("currency.label must not be empty");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: default_base_url(),
                timeout_ms: default_timeout_ms(),
            },
            currency: CurrencyConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}
