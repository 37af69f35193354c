use reqwest::blocking::{Client, ClientBuilder};
use reqwest::redirect::Policy;
use std::time::Duration;

use crate::error::Result;

/// Default Infogram service endpoint
pub const DEFAULT_BASE_URL: &str = "https://infogr.am/service/v1";

/// Create the HTTP client for API requests.
///
/// Redirects are not followed and idle connections are not kept, so every
/// call is exactly one exchange on a fresh connection.
pub fn create_rest_client(config: &Config) -> Result<Client> {
    let mut builder = ClientBuilder::new()
        .pool_max_idle_per_host(0)
        .redirect(Policy::none())
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout);

    if let Some(ref user_agent) = config.user_agent {
        builder = builder.user_agent(user_agent.clone());
    }

    Ok(builder.build()?)
}

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct Config {
    /// Service base URL, without trailing slash
    pub base_url: String,
    /// Whole-request timeout
    pub timeout: Duration,
    /// Connection establishment timeout
    pub connect_timeout: Duration,
    /// User-Agent header, reqwest's default if unset
    pub user_agent: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(300), // 5 minutes
            connect_timeout: Duration::from_secs(10),
            user_agent: None,
        }
    }
}

impl Config {
    /// Create a new configuration for the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Config {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Config::default()
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the User-Agent header
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Get the URL for a target such as `infographics/42`
    pub fn target_url(&self, target: &str) -> String {
        let target = target.trim_start_matches('/');
        if target.is_empty() {
            return self.base_url.trim_end_matches('/').to_string();
        }
        format!("{}/{}", self.base_url.trim_end_matches('/'), target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(300));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_target_url_normalizes_slashes() {
        let config = Config::new("http://localhost:8080/service/v1/");
        assert_eq!(config.base_url, "http://localhost:8080/service/v1");
        assert_eq!(
            config.target_url("/infographics/42"),
            "http://localhost:8080/service/v1/infographics/42"
        );
        assert_eq!(config.target_url(""), "http://localhost:8080/service/v1");
    }

    #[test]
    fn test_builder_methods() {
        let config = Config::new("http://localhost")
            .with_timeout(Duration::from_secs(5))
            .with_connect_timeout(Duration::from_secs(1))
            .with_user_agent("infogram-test");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.connect_timeout, Duration::from_secs(1));
        assert_eq!(config.user_agent.as_deref(), Some("infogram-test"));
    }
}
