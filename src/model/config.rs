use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::triage::ScoringModel;

const ENV_CONFIG_PATH: &str = "TRIAGE_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

const ENV_PREDICTION_BASE_URL: &str = "PREDICTION_BASE_URL";
const DEFAULT_PREDICTION_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_PREDICTION_TIMEOUT_SECS: u64 = 5;

/// Scorer configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TriageConfig {
    /// Level-assignment model used for intake scoring
    #[serde(default)]
    pub model: ScoringModel,
}

/// External disease-prediction service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionConfig {
    /// When false the service is never called and intake scores without a prediction
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_prediction_base_url")]
    pub base_url: String,
    #[serde(default = "default_prediction_timeout")]
    pub timeout_secs: u64,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_prediction_base_url(),
            timeout_secs: DEFAULT_PREDICTION_TIMEOUT_SECS,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_prediction_base_url() -> String {
    DEFAULT_PREDICTION_BASE_URL.to_string()
}

fn default_prediction_timeout() -> u64 {
    DEFAULT_PREDICTION_TIMEOUT_SECS
}

/// Prediction cache configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheConfig {
    /// Overrides the TTL taken from the environment
    #[serde(default)]
    pub ttl_seconds: Option<u64>,
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub triage: TriageConfig,
    #[serde(default)]
    pub prediction: PredictionConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub triage: TriageConfig,
    pub prediction: PredictionConfig,
    pub cache: CacheConfig,
    pub port: u16,
    pub host: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            triage: TriageConfig::default(),
            prediction: PredictionConfig::default(),
            cache: CacheConfig::default(),
            port: 4000,
            host: "127.0.0.1".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(4000);

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let config_path = std::env::var(ENV_CONFIG_PATH)
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let file = Self::load_config_file(&config_path).unwrap_or_default();

        // The environment wins over the file for the prediction endpoint
        let mut prediction = file.prediction;
        if let Ok(url) = std::env::var(ENV_PREDICTION_BASE_URL) {
            prediction.base_url = url;
        }

        Self {
            triage: file.triage,
            prediction,
            cache: file.cache,
            port,
            host,
        }
    }

    /// Load configuration from YAML file
    fn load_config_file(path: &str) -> Option<ConfigFile> {
        let path = Path::new(path);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => match Self::parse_config(&contents) {
                Ok(config) => {
                    tracing::info!(path = %path.display(), "Loaded configuration from file");
                    Some(config)
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to parse config file, using defaults");
                    None
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read config file, using defaults");
                None
            }
        }
    }

    /// Parse YAML config contents; an empty document yields defaults
    fn parse_config(contents: &str) -> Result<ConfigFile, serde_yaml::Error> {
        let contents = contents.trim();
        if contents.is_empty() {
            return Ok(ConfigFile::default());
        }
        serde_yaml::from_str(contents)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse_config("   \n").unwrap();
        assert_eq!(config.triage.model, ScoringModel::Clinical);
        assert!(config.prediction.enabled);
        assert_eq!(config.prediction.base_url, DEFAULT_PREDICTION_BASE_URL);
        assert_eq!(config.prediction.timeout_secs, DEFAULT_PREDICTION_TIMEOUT_SECS);
        assert!(config.cache.ttl_seconds.is_none());
    }

    #[test]
    fn test_partial_config() {
        let yaml = r#"
triage:
  model: weighted_tier
prediction:
  enabled: false
cache:
  ttl_seconds: 600
"#;
        let config = Config::parse_config(yaml).unwrap();
        assert_eq!(config.triage.model, ScoringModel::WeightedTier);
        assert!(!config.prediction.enabled);
        assert_eq!(config.prediction.base_url, DEFAULT_PREDICTION_BASE_URL);
        assert_eq!(config.cache.ttl_seconds, Some(600));
    }

    #[test]
    fn test_unknown_model_is_rejected() {
        let yaml = "triage:\n  model: psychic\n";
        assert!(Config::parse_config(yaml).is_err());
    }

    #[test]
    fn test_bind_addr() {
        let config = Config {
            port: 9000,
            host: "0.0.0.0".to_string(),
            ..Config::default()
        };
        assert_eq!(config.bind_addr(), "0.0.0.0:9000");
    }
}
