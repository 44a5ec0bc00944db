use anyhow::{bail, Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// System-wide location checked when no `--config` is given.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/ispconfig-zabbix-monitoring/config.toml";

/// Development fallback, relative to the working directory.
pub const LOCAL_CONFIG_PATH: &str = "config/Default.toml";

const ENV_PREFIX: &str = "ISPCONFIG_ZABBIX";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub ispconfig: IspConfigSettings,
    #[serde(default)]
    pub modules: ModulesConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Remote API endpoint and credentials.
///
/// Credential fields default to empty so that a missing value is reported by
/// client construction with the offending key name rather than by serde.
#[derive(Debug, Deserialize, Clone)]
pub struct IspConfigSettings {
    #[serde(default)]
    pub soap_uri: String,
    #[serde(default)]
    pub soap_location: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: Option<SecretString>,
    #[serde(default = "default_true")]
    pub verify_ssl: bool,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ModulesConfig {
    #[serde(default = "default_true")]
    pub websites: bool,
    #[serde(default)]
    pub email: bool,
    #[serde(default)]
    pub databases: bool,
    #[serde(default)]
    pub dns: bool,
    #[serde(default)]
    pub ftp: bool,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_delay_seconds")]
    pub delay_seconds: u64,
}

impl Default for ModulesConfig {
    fn default() -> Self {
        Self {
            websites: true,
            email: false,
            databases: false,
            dns: false,
            ftp: false,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_seconds: default_delay_seconds(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    3
}

fn default_delay_seconds() -> u64 {
    2
}

impl ModulesConfig {
    /// Whether the named module toggle is switched on. Unknown names are off.
    pub fn is_enabled(&self, module: &str) -> bool {
        match module {
            "websites" => self.websites,
            "email" => self.email,
            "databases" => self.databases,
            "dns" => self.dns,
            "ftp" => self.ftp,
            _ => false,
        }
    }
}

impl Config {
    /// Load one configuration file, overlaid by `ISPCONFIG_ZABBIX__*` variables.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        // Load environment variables from .env if present
        dotenvy::dotenv().ok();

        let path = path.as_ref();
        let config = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .with_context(|| format!("Failed to build configuration from {}", path.display()))?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Parse an in-memory TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(contents, config::FileFormat::Toml))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Resolve the configuration file: the explicit path if given, otherwise
    /// the first existing entry of [`Config::search_paths`].
    pub fn locate(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(path.to_path_buf());
            }
            bail!("Configuration file not found: {}", path.display());
        }

        let candidates = Self::search_paths();
        if let Some(found) = candidates.iter().find(|p| p.exists()) {
            return Ok(found.clone());
        }

        let searched = candidates
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        bail!("Configuration file not found. Searched locations: {}", searched)
    }

    pub fn search_paths() -> Vec<PathBuf> {
        vec![
            PathBuf::from(SYSTEM_CONFIG_PATH),
            PathBuf::from(LOCAL_CONFIG_PATH),
        ]
    }

    /// [`Config::locate`] followed by [`Config::load`].
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        let path = Self::locate(explicit)?;
        tracing::debug!("Loading configuration from {}", path.display());
        Self::load(path)
    }
}
