use crate::error::{ConfigError, Result};
use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_SEARCH_API_URL: &str = "https://www.googleapis.com/customsearch/v1";
const CONFIG_DIR_NAME: &str = "image-search";
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub search_api_url: String,
    pub search_engine_id: String,
    pub api_key: String,
    pub user_agent: String,
}

/// Optional on-disk fallback for values not set in the environment.
#[derive(Debug, Clone, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    search_api_url: Option<String>,
    #[serde(default)]
    search_engine_id: Option<String>,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    user_agent: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let file = read_file_config()?;
        Self::from_sources(env_opt, file)
    }

    fn from_sources(env: impl Fn(&str) -> Option<String>, file: FileConfig) -> Result<Self> {
        let search_engine_id = env("SEARCH_ENGINE_ID")
            .or(file.search_engine_id.filter(|s| !s.trim().is_empty()))
            .ok_or_else(|| missing("SEARCH_ENGINE_ID"))?
            .trim()
            .to_string();

        let api_key = env("API_KEY")
            .or(file.api_key.filter(|s| !s.trim().is_empty()))
            .ok_or_else(|| missing("API_KEY"))?
            .trim()
            .to_string();

        let search_api_url = env("SEARCH_API_URL")
            .or(file.search_api_url)
            .unwrap_or_else(|| DEFAULT_SEARCH_API_URL.into());
        validate_url(&search_api_url)?;

        let user_agent = env("IMAGE_SEARCH_USER_AGENT")
            .or(file.user_agent)
            .unwrap_or_else(default_user_agent);

        Ok(Self {
            search_api_url: search_api_url.trim().to_string(),
            search_engine_id,
            api_key,
            user_agent,
        })
    }

    pub fn mask_api_key(&self) -> String {
        mask_key(&self.api_key)
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR_NAME)
    }

    pub fn config_file_path() -> PathBuf {
        Self::config_dir().join(CONFIG_FILE_NAME)
    }
}

pub fn default_user_agent() -> String {
    format!("Mozilla/5.0 (compatible; image-search-mcp/{})", env!("CARGO_PKG_VERSION"))
}

fn missing(name: &str) -> ConfigError {
    ConfigError::Missing(format!(
        "{name} not configured.\nSet the {name} environment variable or add it to {}",
        Config::config_file_path().display()
    ))
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

fn validate_url(raw: &str) -> Result<()> {
    let parsed = url::Url::parse(raw.trim())
        .map_err(|e| ConfigError::Invalid(format!("SEARCH_API_URL is not a valid URL: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid("SEARCH_API_URL must be a valid http or https URL".into()));
    }
    Ok(())
}

fn read_file_config() -> Result<FileConfig> {
    let path = Config::config_file_path();
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(FileConfig::default()),
        Err(e) => return Err(ConfigError::File { path, message: e.to_string() }),
    };
    serde_json::from_str(&raw).map_err(|e| ConfigError::File { path, message: e.to_string() })
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.trim().chars().collect();
    if chars.len() <= 8 {
        return "********".into();
    }
    let first: String = chars[..4].iter().collect();
    let last: String = chars[chars.len() - 4..].iter().collect();
    format!("{first}********{last}")
}

#[cfg(test)]
impl Config {
    pub fn for_tests(search_api_url: &str) -> Self {
        Self {
            search_api_url: search_api_url.into(),
            search_engine_id: "test-engine".into(),
            api_key: "test-key".into(),
            user_agent: default_user_agent(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn env_values_are_loaded_with_defaults() {
        let env = env_from(&[("SEARCH_ENGINE_ID", " cx-1 "), ("API_KEY", "key-123")]);
        let config = Config::from_sources(env, FileConfig::default()).unwrap();
        assert_eq!(config.search_engine_id, "cx-1");
        assert_eq!(config.api_key, "key-123");
        assert_eq!(config.search_api_url, DEFAULT_SEARCH_API_URL);
        assert!(config.user_agent.contains("image-search-mcp"));
    }

    #[test]
    fn file_fills_in_missing_env() {
        let file = FileConfig {
            search_engine_id: Some("file-cx".into()),
            api_key: Some("file-key".into()),
            ..Default::default()
        };
        let env = env_from(&[("API_KEY", "env-key")]);
        let config = Config::from_sources(env, file).unwrap();
        assert_eq!(config.search_engine_id, "file-cx");
        assert_eq!(config.api_key, "env-key");
    }

    #[test]
    fn missing_credentials_fail() {
        let env = env_from(&[("SEARCH_ENGINE_ID", "cx")]);
        let err = Config::from_sources(env, FileConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(msg) if msg.starts_with("API_KEY")));
    }

    #[test]
    fn non_http_endpoint_is_rejected() {
        let env = env_from(&[
            ("SEARCH_ENGINE_ID", "cx"),
            ("API_KEY", "key"),
            ("SEARCH_API_URL", "ftp://example.com/search"),
        ]);
        let err = Config::from_sources(env, FileConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn api_key_is_masked() {
        assert_eq!(mask_key("short"), "********");
        assert_eq!(mask_key("AIzaSyABCDEFGH1234"), "AIza********1234");
    }
}
