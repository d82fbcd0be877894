use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://dockporter.vercel.app/api";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub quote: QuoteConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeouts: TimeoutConfig,
}

/// Per-endpoint-weight timeouts, in seconds.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TimeoutConfig {
    pub light_secs: u64,
    pub login_secs: u64,
    pub search_secs: u64,
    pub quote_secs: u64,
    pub booking_secs: u64,
}

/// Requester identity sent with quotes when nobody is logged in.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct QuoteConfig {
    pub requester_ip: String,
    pub anonymous_firstname: String,
    pub anonymous_lastname: String,
    pub anonymous_email: String,
    pub anonymous_country: String,
    pub anonymous_state: String,
    pub anonymous_city: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeouts: TimeoutConfig::default(),
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            light_secs: 10,
            login_secs: 15,
            search_secs: 15,
            quote_secs: 20,
            booking_secs: 20,
        }
    }
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            requester_ip: "127.0.0.1".to_string(),
            anonymous_firstname: "DockMind".to_string(),
            anonymous_lastname: "User".to_string(),
            anonymous_email: "quote@dockmind.ai".to_string(),
            anonymous_country: "USA".to_string(),
            anonymous_state: "CA".to_string(),
            anonymous_city: "Anytown".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TimeoutConfig {
    pub fn light(&self) -> Duration {
        Duration::from_secs(self.light_secs)
    }

    pub fn login(&self) -> Duration {
        Duration::from_secs(self.login_secs)
    }

    pub fn search(&self) -> Duration {
        Duration::from_secs(self.search_secs)
    }

    pub fn quote(&self) -> Duration {
        Duration::from_secs(self.quote_secs)
    }

    pub fn booking(&self) -> Duration {
        Duration::from_secs(self.booking_secs)
    }
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults when
    /// the file does not exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            Config::default()
        };

        // Override with environment variable if set
        config.override_base_url(std::env::var("API_BASE_URL").ok());

        Ok(config)
    }

    fn override_base_url(&mut self, base_url: Option<String>) {
        if let Some(base_url) = base_url.filter(|url| !url.trim().is_empty()) {
            self.api.base_url = base_url;
        }
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content)
            .context("Failed to parse config file")?;

        Ok(config)
    }
}
