//! Startup settings: catalog host and API key.
//!
//! Each setting resolves independently, taking the first non-empty value from
//! command-line flags, then the dotenv config file, then the environment.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use url::Url;

use crate::error::ConfigError;

/// Config file read when no `--config` path is given.
pub const DEFAULT_CONFIG_FILE: &str = ".env";

/// Environment variable consulted for the host.
pub const HOST_ENV: &str = "TWDHCLI_HOST";

/// Environment variable consulted for the API key.
pub const API_KEY_ENV: &str = "TWDHCLI_APIKEY";

const HOST_KEYS: [&str; 2] = ["host", "twdh_host"];
const API_KEY_KEYS: [&str; 2] = ["apikey", "api_key"];

/// Key/value pairs from a dotenv-style config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    path: PathBuf,
    values: HashMap<String, String>,
    found: bool,
}

impl ConfigFile {
    /// Loads `path`. A missing file yields an empty config.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::File`] when the file exists but is not valid
    /// dotenv syntax.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Ok(Self {
                path: path.to_path_buf(),
                ..Default::default()
            });
        }

        let file_err = |source| ConfigError::File {
            path: path.to_path_buf(),
            source,
        };

        let mut values = HashMap::new();
        for item in dotenvy::from_path_iter(path).map_err(file_err)? {
            let (key, value) = item.map_err(file_err)?;
            values.insert(key.to_ascii_lowercase(), value);
        }

        Ok(Self {
            path: path.to_path_buf(),
            values,
            found: true,
        })
    }

    /// Builds a config from in-memory pairs.
    pub fn from_pairs<I, K, V>(path: impl Into<PathBuf>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            path: path.into(),
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.as_ref().to_ascii_lowercase(), v.into()))
                .collect(),
            found: true,
        }
    }

    /// Whether the file existed.
    pub fn found(&self) -> bool {
        self.found
    }

    /// Path the config was (or would have been) read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Case-insensitive lookup of the first non-empty value among `keys`.
    fn first(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|key| self.values.get(*key))
            .find(|value| !value.trim().is_empty())
            .cloned()
    }
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub host: Option<String>,
    pub api_key: Option<String>,
}

/// Fully resolved connection settings.
#[derive(Clone)]
pub struct Settings {
    pub host: Url,
    pub api_key: String,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("host", &self.host.as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl Settings {
    /// Resolves settings with flag > config file > environment precedence.
    ///
    /// `env` is the environment lookup, usually `|k| std::env::var(k).ok()`.
    ///
    /// ## Errors
    ///
    /// Returns an error when either value is missing everywhere or the host is
    /// not an http(s) URL.
    pub fn resolve<F>(
        overrides: &SettingsOverrides,
        file: &ConfigFile,
        env: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.trim().is_empty());

        let host = non_empty(&overrides.host)
            .or_else(|| file.first(&HOST_KEYS))
            .or_else(|| non_empty(&env(HOST_ENV)))
            .ok_or_else(|| ConfigError::MissingHost {
                config_path: file.path().to_path_buf(),
            })?;

        let api_key = non_empty(&overrides.api_key)
            .or_else(|| file.first(&API_KEY_KEYS))
            .or_else(|| non_empty(&env(API_KEY_ENV)))
            .ok_or_else(|| ConfigError::MissingApiKey {
                config_path: file.path().to_path_buf(),
            })?;

        Ok(Self {
            host: parse_host(&host)?,
            api_key: api_key.trim().to_string(),
        })
    }
}

/// Parses a host, defaulting to `https://` when no scheme is given.
pub fn parse_host(host: &str) -> Result<Url, ConfigError> {
    let host = host.trim();
    let candidate = if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{host}")
    };

    let invalid = |message: String| ConfigError::InvalidHost {
        host: host.to_string(),
        message,
    };

    let url = Url::parse(&candidate).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}
