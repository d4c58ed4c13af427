//! # Service Configuration
//!
//! Configuration for the order core: where the database lives, how to reach
//! the payment gateway, and how hard to try when allocating order codes.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     VITRINE_DB_PATH=/var/lib/vitrine/orders.db                         │
//! │     VITRINE_GATEWAY_API_KEY=sk_live_...                                │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/vitrine/vitrine.toml (Linux)                             │
//! │     ~/Library/Application Support/ro.vitrine.vitrine/vitrine.toml      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "./data/orders.db"
//! max_connections = 5
//! busy_timeout_secs = 5
//!
//! [gateway]
//! base_url = "https://api.stripe.com"
//! api_key = "sk_test_..."
//! webhook_secret = "whsec_..."
//! timeout_secs = 10
//! default_currency = "ron"
//!
//! [orders]
//! max_code_attempts = 3
//! ```
//!
//! The API key is never read from a process-wide static: it lives here and
//! is handed to the gateway adapter explicitly.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use vitrine_core::{Currency, DEFAULT_CURRENCY};
use vitrine_db::DbConfig;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to load config: {0}")]
    LoadFailed(String),

    #[error("Failed to save config: {0}")]
    SaveFailed(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::LoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::LoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::SaveFailed(err.to_string())
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Database Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file path.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How long a writer waits for the lock before failing (seconds).
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_secs: u64,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./vitrine.db")
}

fn default_max_connections() -> u32 {
    5
}

fn default_busy_timeout() -> u64 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
            max_connections: default_max_connections(),
            busy_timeout_secs: default_busy_timeout(),
        }
    }
}

// =============================================================================
// Gateway Settings
// =============================================================================

/// Payment gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySettings {
    /// API root, without trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Secret API key. Empty means "not configured".
    #[serde(default)]
    pub api_key: String,

    /// Signing secret for incoming webhooks.
    #[serde(default)]
    pub webhook_secret: Option<String>,

    /// Upper bound for any single gateway call (seconds).
    #[serde(default = "default_gateway_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_currency")]
    pub default_currency: String,
}

fn default_base_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_gateway_timeout() -> u64 {
    10
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl Default for GatewaySettings {
    fn default() -> Self {
        GatewaySettings {
            base_url: default_base_url(),
            api_key: String::new(),
            webhook_secret: None,
            timeout_secs: default_gateway_timeout(),
            default_currency: default_currency(),
        }
    }
}

impl GatewaySettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

// =============================================================================
// Order Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSettings {
    /// Codes drawn per order before giving up with `ConflictRetryable`.
    #[serde(default = "default_max_code_attempts")]
    pub max_code_attempts: u32,
}

fn default_max_code_attempts() -> u32 {
    3
}

impl Default for OrderSettings {
    fn default() -> Self {
        OrderSettings {
            max_code_attempts: default_max_code_attempts(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete order core configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VitrineConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub gateway: GatewaySettings,

    #[serde(default)]
    pub orders: OrderSettings,
}

impl VitrineConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (vitrine.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parses a config file without consulting the environment.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Saves configuration to file, creating parent directories.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ConfigError::SaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::SaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ConfigError::SaveFailed(e.to_string()))?;

        info!(?path, "Config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid("database.max_connections must be greater than 0".into()));
        }

        let url = &self.gateway.base_url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::Invalid(format!(
                "gateway.base_url must start with http:// or https://, got: {}",
                url
            )));
        }

        if self.gateway.timeout_secs == 0 {
            return Err(ConfigError::Invalid("gateway.timeout_secs must be greater than 0".into()));
        }

        Currency::parse(&self.gateway.default_currency)
            .map_err(|e| ConfigError::Invalid(format!("gateway.default_currency: {}", e)))?;

        if self.orders.max_code_attempts == 0 {
            return Err(ConfigError::Invalid("orders.max_code_attempts must be at least 1".into()));
        }

        Ok(())
    }

    /// Applies `VITRINE_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("VITRINE_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Ok(max) = std::env::var("VITRINE_DB_MAX_CONNECTIONS") {
            match max.parse::<u32>() {
                Ok(n) => self.database.max_connections = n,
                Err(_) => warn!(value = %max, "Ignoring non-numeric VITRINE_DB_MAX_CONNECTIONS"),
            }
        }

        if let Ok(url) = std::env::var("VITRINE_GATEWAY_BASE_URL") {
            debug!(url = %url, "Overriding gateway URL from environment");
            self.gateway.base_url = url;
        }

        // Never log the key itself
        if let Ok(key) = std::env::var("VITRINE_GATEWAY_API_KEY") {
            debug!("Overriding gateway API key from environment");
            self.gateway.api_key = key;
        }

        if let Ok(secret) = std::env::var("VITRINE_WEBHOOK_SECRET") {
            self.gateway.webhook_secret = Some(secret);
        }

        if let Ok(secs) = std::env::var("VITRINE_GATEWAY_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(n) => self.gateway.timeout_secs = n,
                Err(_) => warn!(value = %secs, "Ignoring non-numeric VITRINE_GATEWAY_TIMEOUT_SECS"),
            }
        }

        if let Ok(attempts) = std::env::var("VITRINE_MAX_CODE_ATTEMPTS") {
            match attempts.parse::<u32>() {
                Ok(n) => self.orders.max_code_attempts = n,
                Err(_) => warn!(value = %attempts, "Ignoring non-numeric VITRINE_MAX_CODE_ATTEMPTS"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("ro", "vitrine", "vitrine")
            .map(|dirs| dirs.config_dir().join("vitrine.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Pool options for [`vitrine_db::Database::new`].
    pub fn to_db_config(&self) -> DbConfig {
        DbConfig::new(self.database.path.clone())
            .max_connections(self.database.max_connections)
            .busy_timeout(Duration::from_secs(self.database.busy_timeout_secs))
    }

    /// The configured fallback currency.
    pub fn default_currency(&self) -> ConfigResult<Currency> {
        Currency::parse(&self.gateway.default_currency)
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}
