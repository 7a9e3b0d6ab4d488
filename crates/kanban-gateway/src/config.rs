//! Gateway configuration.

use std::time::Duration;

use url::Url;

use crate::error::{GatewayError, Result};

/// Default per-request timeout of the HTTP client.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for [`HttpGateway`](crate::HttpGateway).
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// API base URL, always ending in `/` so relative joins append.
    pub base_url: Url,
    /// Per-request timeout applied by the HTTP client.
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl GatewayConfig {
    /// Creates a config for the given base URL.
    pub fn new(base_url: &str) -> Result<Self> {
        let mut normalized = base_url.trim().to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let base_url = Url::parse(&normalized)
            .map_err(|e| GatewayError::Configuration(format!("invalid base URL {base_url}: {e}")))?;

        Ok(Self {
            base_url,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: format!("kanban-client/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    /// Creates a config from `KANBAN_API_URL`, or the default base URL.
    pub fn from_env() -> Result<Self> {
        Self::new(&kanban_core::api_url())
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Resolves an API path (with or without a leading slash) against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| GatewayError::Configuration(format!("invalid path {path}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_keeps_base_path() {
        let config = GatewayConfig::new("http://localhost:8080/api/v1").unwrap();
        assert_eq!(
            config.endpoint("/boards/3/columns").unwrap().as_str(),
            "http://localhost:8080/api/v1/boards/3/columns"
        );
        assert_eq!(
            config.endpoint("tasks/column/2").unwrap().as_str(),
            "http://localhost:8080/api/v1/tasks/column/2"
        );
    }

    #[test]
    fn test_core_default_url_parses() {
        let config = GatewayConfig::new(kanban_core::DEFAULT_API_URL).unwrap();
        assert_eq!(config.base_url.as_str(), "http://localhost:8080/api/v1/");
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            GatewayConfig::new("not a url"),
            Err(GatewayError::Configuration(_))
        ));
    }

    #[test]
    fn test_builder() {
        let config = GatewayConfig::new("http://127.0.0.1:9000")
            .unwrap()
            .with_request_timeout(Duration::from_secs(2))
            .with_user_agent("test");
        assert_eq!(config.request_timeout, Duration::from_secs(2));
        assert_eq!(config.user_agent, "test");
    }
}
