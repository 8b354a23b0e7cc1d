//! Client configuration and the ambient host configuration fallback.
//!
//! # Design
//! The client is meant to run embedded in a Horde page, where the host exposes
//! `HordeCore.conf` with the AJAX endpoint and session token. That ambient
//! object is modelled as an injected `ConfigProvider`. It is consulted only
//! for values the caller did not pass explicitly, and a missing provider is a
//! hard construction-time error.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;

/// Socket timeout handed to the transport when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The host application's configuration object (`HordeCore.conf`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostConfig {
    #[serde(rename = "URI_AJAX", default)]
    pub uri_ajax: Option<String>,
    #[serde(rename = "TOKEN", default)]
    pub token: Option<String>,
}

impl HostConfig {
    pub fn new(uri_ajax: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            uri_ajax: Some(uri_ajax.into()),
            token: Some(token.into()),
        }
    }

    /// Parse the configuration object as the host page serializes it.
    pub fn from_json(json: &str) -> Result<Self, ApiError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Source of ambient host configuration.
pub trait ConfigProvider {
    /// `None` when the host context is not available.
    fn host_config(&self) -> Option<HostConfig>;
}

impl ConfigProvider for HostConfig {
    fn host_config(&self) -> Option<HostConfig> {
        Some(self.clone())
    }
}

impl<F> ConfigProvider for F
where
    F: Fn() -> Option<HostConfig>,
{
    fn host_config(&self) -> Option<HostConfig> {
        self()
    }
}

/// Construction arguments for [`crate::HordeClient`]. Omitted values are
/// taken from the host configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub token: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            token: Some(token.into()),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fill in missing values from `provider`.
    ///
    /// Fails with [`ApiError::MissingHostContext`] when a value is missing and
    /// there is no host configuration to take it from.
    pub fn resolve(
        self,
        provider: Option<&dyn ConfigProvider>,
    ) -> Result<ResolvedConfig, ApiError> {
        let (base_url, token) = match (self.base_url, self.token) {
            (Some(base_url), Some(token)) => (base_url, token),
            (base_url, token) => {
                let host = provider
                    .and_then(|p| p.host_config())
                    .ok_or(ApiError::MissingHostContext)?;
                debug!("filling client configuration from host context");

                let base_url = base_url.or(host.uri_ajax).ok_or_else(|| {
                    ApiError::Config("host configuration has no URI_AJAX".to_string())
                })?;
                let token = token.or(host.token).ok_or_else(|| {
                    ApiError::Config("host configuration has no TOKEN".to_string())
                })?;
                (base_url, token)
            }
        };

        if base_url.is_empty() {
            return Err(ApiError::Config("base URL is empty".to_string()));
        }

        Ok(ResolvedConfig {
            base_url,
            token,
            timeout: self.timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_values_skip_the_provider() {
        let resolved = ClientConfig::new("https://mail/ajax", "abc")
            .resolve(None)
            .unwrap();
        assert_eq!(resolved.base_url, "https://mail/ajax");
        assert_eq!(resolved.token, "abc");
        assert_eq!(resolved.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn missing_values_without_provider_fail() {
        let err = ClientConfig::default().resolve(None).unwrap_err();
        assert!(matches!(err, ApiError::MissingHostContext));
    }

    #[test]
    fn provider_without_host_context_fails() {
        let absent = || -> Option<HostConfig> { None };
        let err = ClientConfig::default()
            .resolve(Some(&absent))
            .unwrap_err();
        assert!(matches!(err, ApiError::MissingHostContext));
    }

    #[test]
    fn only_missing_values_come_from_host() {
        let host = HostConfig::new("https://host/ajax/", "host-token");
        let config = ClientConfig {
            base_url: Some("https://explicit/ajax".to_string()),
            ..ClientConfig::default()
        };
        let resolved = config.resolve(Some(&host)).unwrap();
        assert_eq!(resolved.base_url, "https://explicit/ajax");
        assert_eq!(resolved.token, "host-token");
    }

    #[test]
    fn host_without_token_is_a_config_error() {
        let host = HostConfig {
            uri_ajax: Some("https://host/ajax".to_string()),
            token: None,
        };
        let err = ClientConfig::default().resolve(Some(&host)).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn empty_base_url_is_rejected() {
        let err = ClientConfig::new("", "abc").resolve(None).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn host_config_parses_horde_keys() {
        let host =
            HostConfig::from_json(r#"{"URI_AJAX":"/horde/services/ajax.php/","TOKEN":"t0k"}"#)
                .unwrap();
        assert_eq!(host, HostConfig::new("/horde/services/ajax.php/", "t0k"));
    }

    #[test]
    fn timeout_is_carried_through() {
        let resolved = ClientConfig::new("https://mail", "t")
            .with_timeout(Duration::from_secs(5))
            .resolve(None)
            .unwrap();
        assert_eq!(resolved.timeout, Duration::from_secs(5));
    }
}
