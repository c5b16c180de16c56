use crate::core::quote_cache::CacheTtl;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const FINNHUB_API_KEY_ENV: &str = "PORTWATCH_FINNHUB_API_KEY";
pub const COINGECKO_API_KEY_ENV: &str = "PORTWATCH_COINGECKO_API_KEY";

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EquityProviderKind {
    #[default]
    Yahoo,
    Finnhub,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EquityProviderConfig {
    #[serde(default)]
    pub kind: EquityProviderKind,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

impl EquityProviderConfig {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(match self.kind {
            EquityProviderKind::Yahoo => "https://query1.finance.yahoo.com",
            EquityProviderKind::Finnhub => "https://finnhub.io",
        })
    }
}

impl Default for EquityProviderConfig {
    fn default() -> Self {
        EquityProviderConfig {
            kind: EquityProviderKind::Yahoo,
            base_url: None,
            api_key: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct CryptoProviderConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

impl CryptoProviderConfig {
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or("https://api.coingecko.com")
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub equity: EquityProviderConfig,
    #[serde(default)]
    pub crypto: CryptoProviderConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Identity every holding is scoped to.
    pub owner: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub cache: CacheTtl,
    pub data_path: Option<String>,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "portwatch", "portwatch")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "portwatch", "portwatch")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let mut config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.apply_env(|name| std::env::var(name).ok());
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Fills API keys absent from the file from the environment.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.providers.equity.api_key.is_none() {
            self.providers.equity.api_key = lookup(FINNHUB_API_KEY_ENV);
        }
        if self.providers.crypto.api_key.is_none() {
            self.providers.crypto.api_key = lookup(COINGECKO_API_KEY_ENV);
        }
    }
}
