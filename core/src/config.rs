//! Client configuration.
//!
//! Defaults match the stock deployment: API under `/api/v1`, mock surface
//! under `/mock`, 10 second request timeout. `from_env` lets a deployment
//! override each value without code changes.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_API_PREFIX: &str = "/api/v1";
pub const DEFAULT_MOCK_PREFIX: &str = "/mock";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Scheme, host and port of the Mocker server.
    pub base_url: String,
    pub api_prefix: String,
    pub mock_prefix: String,
    #[serde(with = "millis")]
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            mock_prefix: DEFAULT_MOCK_PREFIX.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `MOCKER_BASE_URL`, `MOCKER_API_PREFIX`,
    /// `MOCKER_MOCK_PREFIX` and `MOCKER_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let mut config = Self::default();
        if let Some(url) = lookup("MOCKER_BASE_URL") {
            config.base_url = url;
        }
        if let Some(prefix) = lookup("MOCKER_API_PREFIX") {
            config.api_prefix = prefix;
        }
        if let Some(prefix) = lookup("MOCKER_MOCK_PREFIX") {
            config.mock_prefix = prefix;
        }
        if let Some(ms) = lookup("MOCKER_TIMEOUT_MS") {
            let ms: u64 = ms
                .trim()
                .parse()
                .map_err(|_| ApiError::Config(format!("MOCKER_TIMEOUT_MS is not a number: {ms}")))?;
            config.timeout = Duration::from_millis(ms);
        }
        Ok(config)
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn defaults_use_api_v1_and_ten_second_timeout() {
        let config = ClientConfig::default();
        assert_eq!(config.api_prefix, "/api/v1");
        assert_eq!(config.mock_prefix, "/mock");
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn lookup_overrides_defaults() {
        let vars: HashMap<&str, &str> = [
            ("MOCKER_BASE_URL", "http://mocker.internal:9000"),
            ("MOCKER_API_PREFIX", ""),
            ("MOCKER_TIMEOUT_MS", "2500"),
        ]
        .into_iter()
        .collect();
        let config = ClientConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.base_url, "http://mocker.internal:9000");
        assert_eq!(config.api_prefix, "");
        assert_eq!(config.mock_prefix, "/mock");
        assert_eq!(config.timeout, Duration::from_millis(2500));
    }

    #[test]
    fn bad_timeout_is_a_config_error() {
        let err = ClientConfig::from_lookup(|k| (k == "MOCKER_TIMEOUT_MS").then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn deserializes_with_missing_fields() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"base_url":"http://x","timeout":500}"#).unwrap();
        assert_eq!(config.base_url, "http://x");
        assert_eq!(config.api_prefix, "/api/v1");
        assert_eq!(config.timeout, Duration::from_millis(500));
    }
}
