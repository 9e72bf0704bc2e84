//! Client configuration.
//!
//! Configuration can be loaded from:
//! - a TOML file (default: `<config dir>/kbdesk/client.toml`, section `[client]`)
//! - environment variables (`KBDESK_*`)
//!
//! # Example
//!
//! ```rust,no_run
//! use kbdesk_client::config::ClientConfig;
//!
//! // Load from default path or fall back to env vars
//! let config = ClientConfig::load().expect("Failed to load config");
//! ```

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use kbdesk_core::defaults;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid backend: {0}")]
    InvalidBackend(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl From<ConfigError> for kbdesk_core::Error {
    fn from(e: ConfigError) -> Self {
        kbdesk_core::Error::Config(e.to_string())
    }
}

/// Which knowledge service implementation to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Http,
    Mock,
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "mock" => Ok(Self::Mock),
            _ => Err(ConfigError::InvalidBackend(s.to_string())),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Mock => write!(f, "mock"),
        }
    }
}

/// Knowledge service client configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub backend: BackendKind,
    #[serde(default = "ClientConfig::default_base_url")]
    pub base_url: String,
    /// Bearer token sent with every request (optional for local services).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "ClientConfig::default_timeout_secs")]
    pub timeout_secs: u64,
    /// Timeout for document uploads, which carry file bodies.
    #[serde(default = "ClientConfig::default_upload_timeout_secs")]
    pub upload_timeout_secs: u64,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("backend", &self.backend)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("timeout_secs", &self.timeout_secs)
            .field("upload_timeout_secs", &self.upload_timeout_secs)
            .finish()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            base_url: Self::default_base_url(),
            api_key: None,
            timeout_secs: Self::default_timeout_secs(),
            upload_timeout_secs: Self::default_upload_timeout_secs(),
        }
    }
}

static ENV_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("placeholder pattern is valid"));

impl ClientConfig {
    fn default_base_url() -> String {
        defaults::SERVICE_URL.to_string()
    }

    fn default_timeout_secs() -> u64 {
        defaults::REQUEST_TIMEOUT_SECS
    }

    fn default_upload_timeout_secs() -> u64 {
        defaults::UPLOAD_TIMEOUT_SECS
    }

    /// A configuration selecting the mock service.
    pub fn mock() -> Self {
        Self {
            backend: BackendKind::Mock,
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }

    /// Get the default config file path.
    ///
    /// Returns: `<config dir>/kbdesk/client.toml`
    pub fn default_config_path() -> PathBuf {
        let mut path = directories::BaseDirs::new()
            .map(|dirs| dirs.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".config"));
        path.push("kbdesk");
        path.push("client.toml");
        path
    }

    /// Load configuration from the default path, falling back to environment variables.
    pub fn load() -> ConfigResult<Self> {
        let path = Self::default_config_path();

        if path.exists() {
            info!("Loading client config from: {}", path.display());
            Self::from_file(&path)
        } else {
            debug!(
                "Config file not found at {}, using environment variables",
                path.display()
            );
            Self::from_env()
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text, substituting `${VAR}` placeholders.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        #[derive(Deserialize)]
        struct TomlRoot {
            #[serde(default)]
            client: ClientConfig,
        }

        let content = Self::substitute_env_vars(content);
        let root: TomlRoot = toml::from_str(&content)?;
        let mut config = root.client;
        config.api_key = config.api_key.filter(|k| !k.trim().is_empty());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`, which resolves variable names the
    /// way `std::env::var` would.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = match lookup(defaults::ENV_BACKEND) {
            Some(value) => value.parse()?,
            None => BackendKind::default(),
        };

        let config = Self {
            backend,
            base_url: lookup(defaults::ENV_SERVICE_URL)
                .unwrap_or_else(Self::default_base_url),
            api_key: lookup(defaults::ENV_API_KEY).filter(|k| !k.trim().is_empty()),
            timeout_secs: parse_secs(
                defaults::ENV_TIMEOUT_SECS,
                lookup(defaults::ENV_TIMEOUT_SECS),
                Self::default_timeout_secs(),
            )?,
            upload_timeout_secs: parse_secs(
                defaults::ENV_UPLOAD_TIMEOUT_SECS,
                lookup(defaults::ENV_UPLOAD_TIMEOUT_SECS),
                Self::default_upload_timeout_secs(),
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.backend == BackendKind::Http {
            if self.base_url.is_empty() {
                return Err(ConfigError::Validation(
                    "base_url cannot be empty".to_string(),
                ));
            }

            if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
                return Err(ConfigError::Validation(format!(
                    "base_url must start with http:// or https://, got: {}",
                    self.base_url
                )));
            }
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        if self.upload_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "upload_timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Substitute environment variables in the format `${VAR_NAME}`.
    ///
    /// Unset variables are left as written.
    fn substitute_env_vars(content: &str) -> String {
        ENV_PLACEHOLDER
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }
}

fn parse_secs(name: &'static str, value: Option<String>, default: u64) -> ConfigResult<u64> {
    match value {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        None => Ok(default),
    }
}
