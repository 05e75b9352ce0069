//! Configuration for the ledger core and the dashboard server

use serde::Deserialize;
use thiserror::Error;

use std::fs;
use std::path::Path;

/// Environment variable naming an optional TOML configuration file
pub const CONFIG_ENV_VAR: &str = "BANK_LEDGER_CONFIG";

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top level configuration file layout
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Settings of the ledger core
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Account exempt from balance checks when sending
    #[serde(default = "default_privileged_account")]
    pub privileged_account: String,

    /// Opening balance of the privileged account
    #[serde(default = "default_privileged_seed")]
    pub privileged_seed: f64,

    /// Opening balance of every other account
    #[serde(default = "default_balance")]
    pub default_balance: f64,

    /// Coins minted to the miner for each sealed block
    #[serde(default = "default_mining_reward")]
    pub mining_reward: f64,

    /// Number of progress ticks emitted before a block is sealed
    #[serde(default = "default_progress_steps")]
    pub progress_steps: u32,

    /// Delay between two progress ticks, in milliseconds
    #[serde(default = "default_progress_step_ms")]
    pub progress_step_ms: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            privileged_account: default_privileged_account(),
            privileged_seed: default_privileged_seed(),
            default_balance: default_balance(),
            mining_reward: default_mining_reward(),
            progress_steps: default_progress_steps(),
            progress_step_ms: default_progress_step_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_privileged_account() -> String {
    "Bank Network".to_string()
}

fn default_privileged_seed() -> f64 {
    1_000_000.0
}

fn default_balance() -> f64 {
    100.0
}

fn default_mining_reward() -> f64 {
    10.0
}

fn default_progress_steps() -> u32 {
    100
}

fn default_progress_step_ms() -> u64 {
    30
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl LedgerConfig {
    /// Checks that the amounts and pacing make sense
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.privileged_account.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "privileged_account must not be empty".to_string(),
            ));
        }

        for (name, value) in [
            ("privileged_seed", self.privileged_seed),
            ("default_balance", self.default_balance),
            ("mining_reward", self.mining_reward),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        if self.progress_steps == 0 {
            return Err(ConfigError::Invalid(
                "progress_steps must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Config {
    /// Parses a configuration from TOML text and validates it
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.ledger.validate()?;
        Ok(config)
    }

    /// Reads a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Loads the file named by `BANK_LEDGER_CONFIG`, or the defaults when unset
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path),
            _ => Ok(Self::default()),
        }
    }
}
