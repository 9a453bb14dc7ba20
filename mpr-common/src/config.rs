//! Configuration loading
//!
//! Every setting resolves in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`MPR_*`)
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing config file is not an error: the portal starts on defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api_service::ClientConfig;
use crate::{Error, Result};

pub const DEFAULT_API_BASE_URL: &str = "https://abitus-api.geia.vip";
pub const DEFAULT_API_TIMEOUT_MS: u64 = 15_000;
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const ENV_API_BASE_URL: &str = "MPR_API_BASE_URL";
pub const ENV_API_TIMEOUT_MS: &str = "MPR_API_TIMEOUT_MS";
pub const ENV_USE_API_MOCK: &str = "MPR_USE_API_MOCK";
pub const ENV_BIND_ADDR: &str = "MPR_BIND_ADDR";
pub const ENV_PORT: &str = "MPR_PORT";
pub const ENV_LOG_LEVEL: &str = "MPR_LOG_LEVEL";

/// `[logging]` table
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
}

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TomlConfig {
    pub api_base_url: Option<String>,
    pub api_timeout_ms: Option<u64>,
    pub use_api_mock: Option<bool>,
    pub bind_addr: Option<String>,
    pub port: Option<u16>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Values supplied by the command line or the environment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub api_base_url: Option<String>,
    pub api_timeout_ms: Option<u64>,
    pub use_api_mock: Option<bool>,
    pub bind_addr: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

impl Overrides {
    /// Read the `MPR_*` environment variables. Unparseable values are
    /// ignored with a warning.
    pub fn from_env() -> Self {
        Self {
            api_base_url: env_string(ENV_API_BASE_URL),
            api_timeout_ms: env_parsed(ENV_API_TIMEOUT_MS),
            use_api_mock: env_string(ENV_USE_API_MOCK).and_then(|v| parse_bool(&v)),
            bind_addr: env_string(ENV_BIND_ADDR),
            port: env_parsed(ENV_PORT),
            log_level: env_string(ENV_LOG_LEVEL),
        }
    }

    /// Field-wise: keep `self` where set, otherwise take `lower`
    pub fn or(self, lower: Overrides) -> Overrides {
        Overrides {
            api_base_url: self.api_base_url.or(lower.api_base_url),
            api_timeout_ms: self.api_timeout_ms.or(lower.api_timeout_ms),
            use_api_mock: self.use_api_mock.or(lower.use_api_mock),
            bind_addr: self.bind_addr.or(lower.bind_addr),
            port: self.port.or(lower.port),
            log_level: self.log_level.or(lower.log_level),
        }
    }
}

/// Fully resolved portal settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_base_url: String,
    pub api_timeout: Duration,
    pub use_api_mock: bool,
    pub bind_addr: String,
    pub port: u16,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_timeout: Duration::from_millis(DEFAULT_API_TIMEOUT_MS),
            use_api_mock: false,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Settings {
    /// Merge overrides over the TOML file over compiled defaults
    pub fn resolve(overrides: Overrides, toml: TomlConfig) -> Result<Self> {
        let defaults = Settings::default();

        let api_base_url = overrides
            .api_base_url
            .or(toml.api_base_url)
            .unwrap_or(defaults.api_base_url);
        let api_base_url = api_base_url.trim().trim_end_matches('/').to_string();
        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "api_base_url must be an http(s) URL: {}",
                api_base_url
            )));
        }

        let timeout_ms = overrides
            .api_timeout_ms
            .or(toml.api_timeout_ms)
            .unwrap_or(DEFAULT_API_TIMEOUT_MS);
        if timeout_ms == 0 {
            return Err(Error::Config("api_timeout_ms must be greater than zero".to_string()));
        }

        Ok(Self {
            api_base_url,
            api_timeout: Duration::from_millis(timeout_ms),
            use_api_mock: overrides
                .use_api_mock
                .or(toml.use_api_mock)
                .unwrap_or(defaults.use_api_mock),
            bind_addr: overrides
                .bind_addr
                .or(toml.bind_addr)
                .unwrap_or(defaults.bind_addr),
            port: overrides.port.or(toml.port).unwrap_or(defaults.port),
            log_level: overrides
                .log_level
                .or(toml.logging.level)
                .unwrap_or(defaults.log_level),
        })
    }

    /// Upstream client settings derived from the portal settings
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api_base_url.clone(),
            timeout: self.api_timeout,
            use_mock: self.use_api_mock,
            ..ClientConfig::default()
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// Settings as a fully populated config file
    pub fn to_toml(&self) -> TomlConfig {
        TomlConfig {
            api_base_url: Some(self.api_base_url.clone()),
            api_timeout_ms: Some(self.api_timeout.as_millis() as u64),
            use_api_mock: Some(self.use_api_mock),
            bind_addr: Some(self.bind_addr.clone()),
            port: Some(self.port),
            logging: LoggingConfig {
                level: Some(self.log_level.clone()),
            },
        }
    }
}

/// Locate the config file: explicit path, then the user config directory
/// (`~/.config/mpr/config.toml` on Linux), then `/etc/mpr/config.toml`.
pub fn find_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Some(path) = default_config_path() {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(unix) {
        let system_config = PathBuf::from("/etc/mpr/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Per-user config file location (`~/.config/mpr/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("mpr").join("config.toml"))
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Config file contents and where they came from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedConfig {
    pub config: TomlConfig,
    /// `None` when no file was found and defaults apply
    pub source: Option<PathBuf>,
}

/// Load the config file if one exists, falling back to an empty config.
///
/// An explicitly named file that is missing or malformed is still an error.
/// Nothing is logged here; this runs before the subscriber is installed.
pub fn load_or_default(explicit: Option<&Path>) -> Result<LoadedConfig> {
    match find_config_file(explicit) {
        Some(path) if path.exists() => Ok(LoadedConfig {
            config: load_toml_config(&path)?,
            source: Some(path),
        }),
        Some(path) => Err(Error::Config(format!(
            "Config file not found: {}",
            path.display()
        ))),
        None => Ok(LoadedConfig::default()),
    }
}

/// Write a config file (used by `--write-default-config`)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env_string(name)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a valid value", name, raw);
            None
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" off "), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_to_toml_resolves_back_to_same_settings() {
        let settings = Settings {
            port: 8080,
            use_api_mock: true,
            ..Settings::default()
        };
        let again = Settings::resolve(Overrides::default(), settings.to_toml()).unwrap();
        assert_eq!(again, settings);
    }

    #[test]
    fn test_overrides_or_prefers_self() {
        let cli = Overrides {
            port: Some(8080),
            ..Default::default()
        };
        let env = Overrides {
            port: Some(9090),
            use_api_mock: Some(true),
            ..Default::default()
        };
        let merged = cli.or(env);
        assert_eq!(merged.port, Some(8080));
        assert_eq!(merged.use_api_mock, Some(true));
    }
}
