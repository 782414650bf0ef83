/// Startup configuration
///
/// Everything is read from environment variables once, in `main`.
/// Nothing here is required: without an API key the app still starts
/// and reports the problem when Generate is pressed.
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Could not determine a data directory; set PRODUCT_COPY_DATA_DIR")]
    NoDataDir,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Gemini API key
    pub api_key: Option<String>,
    /// Model name used in the request path
    pub model: String,
    /// API base URL
    pub endpoint: String,
    /// Where settings.db lives
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            data_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Resolve from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir = match get("PRODUCT_COPY_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir().ok_or(ConfigError::NoDataDir)?,
        };

        Ok(Self {
            api_key: get("GEMINI_API_KEY").or_else(|| get("API_KEY")),
            model: get("PRODUCT_COPY_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            endpoint: get("PRODUCT_COPY_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            data_dir,
        })
    }
}

/// Platform data directory for this app
fn default_data_dir() -> Option<PathBuf> {
    let mut path = dirs::data_dir().or_else(dirs::home_dir)?;
    path.push("product-copy");
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("PRODUCT_COPY_DATA_DIR", "/tmp/pc")])).unwrap();

        assert_eq!(config.api_key, None);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/pc"));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PRODUCT_COPY_DATA_DIR", "/tmp/pc"),
            ("GEMINI_API_KEY", "secret"),
            ("PRODUCT_COPY_MODEL", "gemini-2.0-flash"),
            ("PRODUCT_COPY_ENDPOINT", "http://localhost:8080/v1beta"),
        ]))
        .unwrap();

        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.endpoint, "http://localhost:8080/v1beta");
    }

    #[test]
    fn test_api_key_fallback_and_blank_values() {
        let config = Config::from_lookup(lookup(&[
            ("PRODUCT_COPY_DATA_DIR", "/tmp/pc"),
            ("GEMINI_API_KEY", "  "),
            ("API_KEY", "legacy"),
            ("PRODUCT_COPY_MODEL", ""),
        ]))
        .unwrap();

        assert_eq!(config.api_key.as_deref(), Some("legacy"));
        assert_eq!(config.model, DEFAULT_MODEL);
    }
}
