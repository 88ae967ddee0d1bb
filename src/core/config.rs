use crate::core::calculator::ElapsedYearsPolicy;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// A named instrument and its provider symbol.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Instrument {
    pub name: String,
    pub symbol: String,
}

impl Instrument {
    pub fn new(name: &str, symbol: &str) -> Self {
        Instrument {
            name: name.to_string(),
            symbol: symbol.to_string(),
        }
    }
}

/// Built-in instrument list, in display order.
pub fn default_instruments() -> Vec<Instrument> {
    [
        ("S&P 500 (SPY)", "SPY"),
        ("NASDAQ-100 (QQQ)", "QQQ"),
        ("Russell 2000 (IWM)", "IWM"),
        ("Total Market (VTI)", "VTI"),
        ("Tech Sector (XLK)", "XLK"),
        ("Nifty 50", "^NSEI"),
        ("Bank Nifty", "^NSEBANK"),
    ]
    .into_iter()
    .map(|(name, symbol)| Instrument::new(name, symbol))
    .collect()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YahooProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub yahoo: Option<YahooProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            yahoo: Some(YahooProviderConfig {
                base_url: DEFAULT_YAHOO_BASE_URL.to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_instruments")]
    pub instruments: Vec<Instrument>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub elapsed_years: ElapsedYearsPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            instruments: default_instruments(),
            providers: ProvidersConfig::default(),
            elapsed_years: ElapsedYearsPolicy::default(),
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, or the built-in defaults
    /// when no config file has been created.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using built-in instruments",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "etfcagr", "etfcagr")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn yahoo_base_url(&self) -> &str {
        self.providers
            .yahoo
            .as_ref()
            .map_or(DEFAULT_YAHOO_BASE_URL, |p| &p.base_url)
    }
}
