use super::universe::{FundCategory, Universe};
use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const API_KEY_ENV: &str = "ALPHA_VANTAGE_KEY";

fn default_base_url() -> String {
    "https://www.alphavantage.co".to_string()
}

fn default_request_delay_secs() -> u64 {
    12
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retries() -> usize {
    1
}

fn default_top() -> usize {
    5
}

fn default_fetch_prices() -> bool {
    true
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AlphaVantageConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Minimum spacing between requests; 12s keeps under 5 requests/minute
    #[serde(default = "default_request_delay_secs")]
    pub request_delay_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retries for connection-level failures
    #[serde(default = "default_retries")]
    pub retries: usize,
}

impl Default for AlphaVantageConfig {
    fn default() -> Self {
        AlphaVantageConfig {
            base_url: default_base_url(),
            api_key: None,
            request_delay_secs: default_request_delay_secs(),
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub alpha_vantage: Option<AlphaVantageConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            alpha_vantage: Some(AlphaVantageConfig::default()),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SearchConfig {
    /// Number of ranked funds shown by the holders command
    #[serde(default = "default_top")]
    pub top: usize,
    #[serde(default = "default_fetch_prices")]
    pub fetch_prices: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            top: default_top(),
            fetch_prices: default_fetch_prices(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Replaces the built-in fund universe when present
    #[serde(default)]
    pub universe: Option<Vec<FundCategory>>,
    #[serde(default)]
    pub search: SearchConfig,
}

impl AppConfig {
    /// Loads the config at the default location, or defaults when no file
    /// exists there.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("", "", "etfscope")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn alpha_vantage(&self) -> AlphaVantageConfig {
        self.providers.alpha_vantage.clone().unwrap_or_default()
    }

    /// API key from the environment, falling back to the config file.
    pub fn api_key(&self) -> Result<String> {
        let from_env = std::env::var(API_KEY_ENV).ok();
        self.resolve_api_key(from_env)
    }

    fn resolve_api_key(&self, from_env: Option<String>) -> Result<String> {
        let key = from_env
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.alpha_vantage().api_key)
            .filter(|k| !k.trim().is_empty());
        match key {
            Some(key) => Ok(key.trim().to_string()),
            None => bail!(
                "No Alpha Vantage API key configured. Set {} or providers.alpha_vantage.api_key",
                API_KEY_ENV
            ),
        }
    }

    pub fn universe(&self) -> Universe {
        match &self.universe {
            Some(categories) if !categories.is_empty() => Universe {
                categories: categories.clone(),
            },
            _ => Universe::builtin(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
providers:
  alpha_vantage:
    base_url: "http://example.com/av"
    api_key: "FILEKEY"
    request_delay_secs: 0
universe:
  - name: "Core"
    funds: ["SPY", "QQQ"]
  - name: "Bonds"
    funds: ["AGG"]
search:
  top: 10
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        let av = config.alpha_vantage();
        assert_eq!(av.base_url, "http://example.com/av");
        assert_eq!(av.request_delay_secs, 0);
        assert_eq!(av.timeout_secs, 30);
        assert_eq!(av.retries, 1);
        assert_eq!(config.search.top, 10);
        assert!(config.search.fetch_prices);

        let universe = config.universe();
        assert_eq!(universe.categories.len(), 2);
        assert_eq!(universe.funds(), vec!["SPY", "QQQ", "AGG"]);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").unwrap();
        let av = config.alpha_vantage();
        assert_eq!(av.base_url, "https://www.alphavantage.co");
        assert_eq!(av.request_delay_secs, 12);
        assert_eq!(config.search.top, 5);
        assert_eq!(config.universe(), Universe::builtin());
    }

    #[test]
    fn test_api_key_resolution() {
        let yaml_str = r#"
providers:
  alpha_vantage:
    api_key: "FILEKEY"
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();
        assert_eq!(config.resolve_api_key(None).unwrap(), "FILEKEY");
        assert_eq!(
            config
                .resolve_api_key(Some("ENVKEY".to_string()))
                .unwrap(),
            "ENVKEY"
        );
        assert_eq!(
            config.resolve_api_key(Some("  ".to_string())).unwrap(),
            "FILEKEY"
        );

        let empty = AppConfig::default();
        let err = empty.resolve_api_key(None).unwrap_err();
        assert!(err.to_string().contains(API_KEY_ENV));
    }
}
