//! Environment-driven client configuration.
//!
//! Resolution order for each setting:
//! 1. Explicit builder calls made after [`ClientBuilder::from_env`]
//! 2. `MCP_REGISTRY_*` environment variables
//! 3. Built-in defaults

use std::time::Duration;

use crate::client::ClientBuilder;
use crate::error::{Error, Result};

/// Overrides the registry base URL.
pub const BASE_URL_ENV: &str = "MCP_REGISTRY_BASE_URL";
/// Overrides the user agent.
pub const USER_AGENT_ENV: &str = "MCP_REGISTRY_USER_AGENT";
/// Overrides the default transport timeout, in whole seconds.
pub const TIMEOUT_ENV: &str = "MCP_REGISTRY_TIMEOUT_SECS";

impl ClientBuilder {
    /// Create a builder seeded from `MCP_REGISTRY_*` environment variables.
    ///
    /// Unset or blank variables are ignored. The base URL is validated when
    /// the client is built.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`ClientBuilder::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut builder = Self::new();
        if let Some(url) = get(BASE_URL_ENV) {
            builder = builder.base_url(url);
        }
        if let Some(agent) = get(USER_AGENT_ENV) {
            builder = builder.user_agent(agent);
        }
        if let Some(raw) = get(TIMEOUT_ENV) {
            let secs: u64 = raw.parse().map_err(|_| {
                Error::config(format!(
                    "{} must be a whole number of seconds, got {:?}",
                    TIMEOUT_ENV, raw
                ))
            })?;
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_empty_environment_uses_defaults() {
        let client = ClientBuilder::from_lookup(lookup(&[])).unwrap().build().unwrap();
        assert_eq!(client.base_url().as_str(), crate::client::DEFAULT_BASE_URL);
    }

    #[test]
    fn test_environment_overrides() {
        let client = ClientBuilder::from_lookup(lookup(&[
            (BASE_URL_ENV, "http://localhost:8080/registry"),
            (USER_AGENT_ENV, "my-tool/1.0"),
            (TIMEOUT_ENV, "5"),
        ]))
        .unwrap()
        .build()
        .unwrap();

        assert_eq!(client.base_url().as_str(), "http://localhost:8080/registry/");
        assert_eq!(client.user_agent(), "my-tool/1.0");
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let client = ClientBuilder::from_lookup(lookup(&[(BASE_URL_ENV, "   ")]))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(client.base_url().as_str(), crate::client::DEFAULT_BASE_URL);
    }

    #[test]
    fn test_explicit_builder_call_wins() {
        let client = ClientBuilder::from_lookup(lookup(&[(BASE_URL_ENV, "http://env.example.com")]))
            .unwrap()
            .base_url("https://explicit.example.com")
            .build()
            .unwrap();
        assert_eq!(client.base_url().as_str(), "https://explicit.example.com/");
    }

    #[test]
    fn test_invalid_timeout() {
        let err = ClientBuilder::from_lookup(lookup(&[(TIMEOUT_ENV, "soon")])).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains(TIMEOUT_ENV));
    }

    #[test]
    fn test_invalid_base_url_fails_at_build() {
        let builder = ClientBuilder::from_lookup(lookup(&[(BASE_URL_ENV, "ftp://example.com")]))
            .unwrap();
        let err = builder.build().unwrap_err();
        assert!(err.to_string().contains("HTTP or HTTPS"));
    }
}
