use crate::error::Result;
use serde::Deserialize;
use std::fs;
use std::time::Duration;

/// Fetch knobs shared by every crawler. Loaded from `config.toml` when the
/// file exists, otherwise the compiled-in defaults apply.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Total request attempts for a single URL, including the first one.
    pub max_retries: u32,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
    /// Fixed delay between retry attempts, in seconds.
    pub backoff_seconds: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            timeout_seconds: 30,
            backoff_seconds: 2,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_seconds)
    }
}

/// Knobs for the headless-browser session used by script-rendered listings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// How long to wait for the listing marker element to appear.
    pub ready_timeout_seconds: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            ready_timeout_seconds: 20,
        }
    }
}

impl BrowserConfig {
    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_seconds)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub browser: BrowserConfig,
}

impl Config {
    /// Load `config.toml` from the working directory. A missing file is not
    /// an error; only a file that exists but fails to parse is fatal.
    pub fn load() -> Result<Self> {
        let config_path = "config.toml";
        match fs::read_to_string(config_path) {
            Ok(content) => {
                let config: Config = toml::from_str(&content)?;
                Ok(config)
            }
            Err(_) => Ok(Config::default()),
        }
    }
}
