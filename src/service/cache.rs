//! Redis cache for disease predictions

use std::env;

use redis::{AsyncCommands, Client};
use serde::{Serialize, de::DeserializeOwned};
use sha2::{Digest, Sha256};

// Environment variable names
const ENV_REDIS_HOST: &str = "TRIAGE_REDIS_HOST";
const ENV_REDIS_PORT: &str = "TRIAGE_REDIS_PORT";
const ENV_REDIS_PASSWORD: &str = "TRIAGE_REDIS_PASSWORD";
const ENV_REDIS_DB: &str = "TRIAGE_REDIS_DB";
const ENV_CACHE_TTL: &str = "TRIAGE_CACHE_TTL";

// Default values
const DEFAULT_REDIS_HOST: &str = "127.0.0.1";
const DEFAULT_REDIS_PORT: &str = "6379";
const DEFAULT_REDIS_DB: &str = "0";
const DEFAULT_TTL_SECONDS: u64 = 3600; // 1 hour

const PREFIX_PREDICTION: &str = "prediction:";

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CacheError {
    #[error("Redis connection error: {0}")]
    Connection(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Cache miss for key: {0}")]
    Miss(String),
}

/// Redis-backed cache of analyzer responses keyed by symptom text
#[derive(Clone)]
pub struct PredictionCache {
    client: Client,
    ttl_seconds: u64,
}

impl PredictionCache {
    /// Create a new cache instance and verify connection
    ///
    /// Configuration via environment variables:
    /// - `TRIAGE_REDIS_HOST` - Redis host (default: 127.0.0.1)
    /// - `TRIAGE_REDIS_PORT` - Redis port (default: 6379)
    /// - `TRIAGE_REDIS_PASSWORD` - Redis password (default: none)
    /// - `TRIAGE_REDIS_DB` - Redis database number (default: 0)
    /// - `TRIAGE_CACHE_TTL` - Cache TTL in seconds (default: 3600)
    ///
    /// `ttl_override` (from the config file) takes precedence over `TRIAGE_CACHE_TTL`.
    pub async fn new(ttl_override: Option<u64>) -> Result<Self, CacheError> {
        let host = env::var(ENV_REDIS_HOST).unwrap_or_else(|_| DEFAULT_REDIS_HOST.to_string());
        let port = env::var(ENV_REDIS_PORT).unwrap_or_else(|_| DEFAULT_REDIS_PORT.to_string());
        let password = env::var(ENV_REDIS_PASSWORD).ok();
        let db = env::var(ENV_REDIS_DB).unwrap_or_else(|_| DEFAULT_REDIS_DB.to_string());

        let ttl_seconds = ttl_override.unwrap_or_else(|| {
            env::var(ENV_CACHE_TTL)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TTL_SECONDS)
        });

        // Build Redis URL: redis://[password@]host:port/db
        let redis_url = match password {
            Some(pwd) if !pwd.is_empty() => format!("redis://:{}@{}:{}/{}", pwd, host, port, db),
            _ => format!("redis://{}:{}/{}", host, port, db),
        };

        tracing::debug!(host = %host, port = %port, db = %db, "Connecting to Redis");

        let client = Client::open(redis_url)?;

        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;

        tracing::info!(host = %host, port = %port, ttl = ttl_seconds, "Redis connection established");

        Ok(Self {
            client,
            ttl_seconds,
        })
    }

    /// Get a cached prediction for this symptom text
    pub async fn get_prediction<T: DeserializeOwned>(&self, symptoms: &str) -> Result<T, CacheError> {
        let key = format!("{}{}", PREFIX_PREDICTION, symptom_key(symptoms));
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let data: Option<String> = conn.get(&key).await?;

        match data {
            Some(json) => {
                serde_json::from_str(&json).map_err(|e| CacheError::Serialization(e.to_string()))
            }
            None => Err(CacheError::Miss(key)),
        }
    }

    /// Cache a prediction for this symptom text
    pub async fn set_prediction<T: Serialize>(&self, symptoms: &str, data: &T) -> Result<(), CacheError> {
        let key = format!("{}{}", PREFIX_PREDICTION, symptom_key(symptoms));
        let json =
            serde_json::to_string(data).map_err(|e| CacheError::Serialization(e.to_string()))?;

        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(&key, json, self.ttl_seconds).await?;

        tracing::debug!(key = %key, ttl = self.ttl_seconds, "Cached prediction");
        Ok(())
    }
}

/// SHA-256 of the trimmed, lower-cased symptom text
fn symptom_key(symptoms: &str) -> String {
    let normalized = symptoms.trim().to_lowercase();
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symptom_key_normalizes_text() {
        assert_eq!(symptom_key("  Fever and Rash "), symptom_key("fever and rash"));
        assert_ne!(symptom_key("fever"), symptom_key("rash"));
        assert_eq!(symptom_key("fever").len(), 64);
    }
}
