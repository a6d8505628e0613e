use std::str::FromStr;
use std::time::Duration;

use tracing::info;

use crate::error::{FeedError, Result};
use crate::session::{Operator, Session};
use crate::websocket::ReconnectPolicy;

const DEFAULT_API_URL: &str = "https://staging-brain.rizosfelices.co/";
const DEFAULT_WS_URL: &str = "wss://staging-brain.rizosfelices.co/ws";
const DEFAULT_OPERATOR_NAME: &str = "Agente";
const DEFAULT_OPERATOR_ROLE: &str = "agent";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

/// Runtime settings for the feed: endpoints, credentials and socket policy.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub api_url: String,
    pub ws_url: String,
    pub api_token: Option<String>,
    pub operator_name: String,
    pub operator_role: String,
    pub http_timeout: Duration,
    pub reconnect: ReconnectPolicy,
}

impl FeedConfig {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let build_time = |key: &str| match key {
            "OMNI_API_URL" => option_env!("OMNI_API_URL").map(String::from),
            "OMNI_WS_URL" => option_env!("OMNI_WS_URL").map(String::from),
            _ => None,
        };

        Self::from_lookup(|key| build_time(key).or_else(|| std::env::var(key).ok()))
    }

    /// Resolve every setting through `lookup`; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = get("OMNI_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let ws_url = get("OMNI_WS_URL").unwrap_or_else(|| DEFAULT_WS_URL.to_string());
        info!(api = %api_url, ws = %ws_url, "Using conversation endpoints");

        let defaults = ReconnectPolicy::default();
        let reconnect = ReconnectPolicy {
            max_retries: parse_or(&get, "OMNI_WS_MAX_RETRIES", defaults.max_retries)?,
            base_delay: Duration::from_millis(parse_or(
                &get,
                "OMNI_WS_BASE_DELAY_MS",
                defaults.base_delay.as_millis() as u64,
            )?),
            max_delay: Duration::from_millis(parse_or(
                &get,
                "OMNI_WS_MAX_DELAY_MS",
                defaults.max_delay.as_millis() as u64,
            )?),
        };

        Ok(Self {
            api_url,
            ws_url,
            api_token: get("OMNI_API_TOKEN"),
            operator_name: get("OMNI_OPERATOR_NAME")
                .unwrap_or_else(|| DEFAULT_OPERATOR_NAME.to_string()),
            operator_role: get("OMNI_OPERATOR_ROLE")
                .unwrap_or_else(|| DEFAULT_OPERATOR_ROLE.to_string()),
            http_timeout: Duration::from_secs(parse_or(
                &get,
                "OMNI_HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?),
            reconnect,
        })
    }

    pub fn session(&self) -> Session {
        Session::new(
            self.api_token.clone(),
            Operator {
                name: self.operator_name.clone(),
                role: self.operator_role.clone(),
            },
        )
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.trim().parse::<T>().map_err(|e| FeedError::Config {
            key: key.to_string(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = FeedConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.ws_url, DEFAULT_WS_URL);
        assert!(config.api_token.is_none());
        assert_eq!(config.operator_name, "Agente");
        assert_eq!(config.http_timeout, Duration::from_secs(15));
        assert_eq!(config.reconnect.max_retries, 3);
        assert_eq!(config.reconnect.base_delay, Duration::from_millis(3000));
        assert_eq!(config.reconnect.max_delay, Duration::from_millis(10000));
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = FeedConfig::from_lookup(lookup(&[
            ("OMNI_API_URL", "http://127.0.0.1:8080/"),
            ("OMNI_API_TOKEN", "secret"),
            ("OMNI_OPERATOR_ROLE", "admin"),
            ("OMNI_WS_MAX_RETRIES", "5"),
            ("OMNI_WS_BASE_DELAY_MS", "10"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "http://127.0.0.1:8080/");
        assert_eq!(config.api_token.as_deref(), Some("secret"));
        assert_eq!(config.reconnect.max_retries, 5);
        assert_eq!(config.reconnect.base_delay, Duration::from_millis(10));
        assert!(config.session().is_admin());
    }

    #[test]
    fn test_blank_token_is_treated_as_missing() {
        let config = FeedConfig::from_lookup(lookup(&[("OMNI_API_TOKEN", "  ")])).unwrap();
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_bad_number_is_config_error() {
        let err = FeedConfig::from_lookup(lookup(&[("OMNI_WS_MAX_RETRIES", "three")]))
            .unwrap_err();
        match err {
            FeedError::Config { key, .. } => assert_eq!(key, "OMNI_WS_MAX_RETRIES"),
            other => panic!("Expected config error, got {other:?}"),
        }
    }
}
