//! Lookup configuration: defaults, `~/.flightdesk/config.toml`, environment

use crate::candidate::Category;
use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);
pub const DEFAULT_MIN_QUERY_LEN: usize = 2;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Overrides the API base URL from the config file
pub const API_URL_ENV: &str = "FLIGHTDESK_API_URL";
/// Overrides the config file location
pub const CONFIG_PATH_ENV: &str = "FLIGHTDESK_CONFIG";

fn default_base_url() -> String {
    #[cfg(debug_assertions)]
    return "http://localhost:3001".to_string();
    #[cfg(not(debug_assertions))]
    return "https://api.flightdesk.app".to_string();
}

#[derive(Debug, Clone, PartialEq)]
pub struct LookupConfig {
    /// Base URL of the lookup API, without trailing slash
    pub base_url: String,
    /// Quiet period after the last keystroke before a lookup fires
    pub debounce: Duration,
    /// Minimum trimmed query length (in chars) that triggers a lookup
    pub min_query_len: usize,
    /// Per-request HTTP timeout
    pub timeout: Duration,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            debounce: DEFAULT_DEBOUNCE,
            min_query_len: DEFAULT_MIN_QUERY_LEN,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    lookup: LookupSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LookupSection {
    base_url: Option<String>,
    debounce_ms: Option<u64>,
    timeout_secs: Option<u64>,
}

/// Location of the user config file, if a home directory can be found
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|home| home.join(".flightdesk").join("config.toml"))
}

impl LookupConfig {
    /// Load from the default config file and environment
    pub fn load() -> Result<Self, ConfigError> {
        let env_url = std::env::var(API_URL_ENV).ok();
        Self::resolve(config_file_path().as_deref(), env_url.as_deref())
    }

    /// Layer an optional config file and an optional URL override over the defaults.
    /// A missing file is not an error.
    pub fn resolve(file: Option<&Path>, url_override: Option<&str>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = file.filter(|p| p.exists()) {
            log::debug!("Loading lookup config from {}", path.display());
            let contents = fs::read_to_string(path)?;
            config.apply_toml(&contents)?;
        }

        if let Some(url) = url_override {
            config.set_base_url(url)?;
        }

        Ok(config)
    }

    fn apply_toml(&mut self, contents: &str) -> Result<(), ConfigError> {
        let file: ConfigFile = toml::from_str(contents)?;
        let section = file.lookup;

        if let Some(url) = section.base_url {
            self.set_base_url(&url)?;
        }
        if let Some(ms) = section.debounce_ms {
            self.debounce = Duration::from_millis(ms);
        }
        if let Some(secs) = section.timeout_secs {
            self.timeout = Duration::from_secs(secs);
        }
        Ok(())
    }

    /// Validate and store a base URL. Must be absolute http(s).
    pub fn set_base_url(&mut self, raw: &str) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidUrl {
            url: raw.to_string(),
            reason,
        };

        let parsed = url::Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
        }
        if parsed.query().is_some() {
            return Err(invalid("must not contain a query string".to_string()));
        }

        self.base_url = raw.trim_end_matches('/').to_string();
        Ok(())
    }

    /// Full URL of the endpoint for a category, without query string
    pub fn endpoint_url(&self, category: Category) -> String {
        format!("{}{}", self.base_url, category.endpoint())
    }
}
