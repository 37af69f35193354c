use crate::apikey::ApiKey;
use crate::client::{create_rest_client, Config};
use crate::dispatch::{Dispatcher, Method};
use crate::error::Result;
use crate::params::ParameterSet;
use crate::response::{Response, ResponseShape};
use crate::signature::SignatureAlgorithm;

/// Entry point for signed calls to the Infogram API
#[derive(Debug, Clone)]
pub struct InfogramApi {
    /// Request dispatcher
    dispatcher: Dispatcher,
    /// Configuration
    pub config: Config,
    /// API key and secret used to sign every request
    api_key: ApiKey,
}

impl InfogramApi {
    /// Create a new API client with default configuration
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Result<Self> {
        Self::with_config(ApiKey::new(key, secret)?, Config::default())
    }

    /// Create a new API client with custom configuration
    pub fn with_config(api_key: ApiKey, config: Config) -> Result<Self> {
        let client = create_rest_client(&config)?;
        Ok(InfogramApi {
            dispatcher: Dispatcher::new(client),
            config,
            api_key,
        })
    }

    /// Create a new API client signing with a non-default algorithm
    pub fn with_algorithm(
        key: impl Into<String>,
        secret: impl Into<String>,
        algorithm: SignatureAlgorithm,
        config: Config,
    ) -> Result<Self> {
        Self::with_config(ApiKey::with_algorithm(key, secret, algorithm)?, config)
    }

    pub fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    /// Build the signed parameter set for a call
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `base_url` - Full URL of the target, without query string
    /// * `params` - Caller parameters, excluding `api_key` and `api_sig`
    pub fn sign_params(
        &self,
        method: Method,
        base_url: &str,
        mut params: ParameterSet,
    ) -> Result<ParameterSet> {
        self.api_key
            .apply_params(method.as_str(), base_url, &mut params)?;
        Ok(params)
    }

    /// Execute a signed request and wrap the result in the requested shape
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `target` - Path below the base URL, e.g. `infographics/42`
    /// * `params` - Caller parameters, excluding `api_key` and `api_sig`
    /// * `shape` - How the response body will be read
    ///
    /// A failed connection does not make this call fail; the error surfaces
    /// when the response status or body is accessed.
    pub fn send_request<I, K, V>(
        &self,
        method: Method,
        target: &str,
        params: I,
        shape: ResponseShape,
    ) -> Result<Response>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let base_url = self.config.target_url(target);
        let params = self.sign_params(method, &base_url, params.into_iter().collect())?;

        tracing::debug!(method = %method, url = %base_url, shape = %shape, "sending request");

        let exchange = self.dispatcher.dispatch(method, &base_url, &params)?;
        Ok(Response::from_exchange(shape, exchange))
    }

    /// Like [`send_request`](Self::send_request), taking the method and shape
    /// by name as the calling layer may hold them
    pub fn send<I, K, V>(
        &self,
        method: &str,
        target: &str,
        params: I,
        shape: &str,
    ) -> Result<Response>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let method: Method = method.parse()?;
        let shape: ResponseShape = shape.parse()?;
        self.send_request(method, target, params, shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InfogramError;

    #[test]
    fn test_api_creation() {
        let api = InfogramApi::new("abc123", "s3cr3t").unwrap();
        assert_eq!(api.config.base_url, "https://infogr.am/service/v1");
        assert_eq!(api.api_key().key_id, "abc123");
    }

    #[test]
    fn test_api_with_config() {
        let config = Config::new("http://localhost:8080");
        let api = InfogramApi::with_config(ApiKey::new("abc123", "s3cr3t").unwrap(), config).unwrap();
        assert_eq!(api.config.target_url("themes"), "http://localhost:8080/themes");
    }

    #[test]
    fn test_sign_params_keeps_caller_order() {
        let api = InfogramApi::new("abc123", "s3cr3t").unwrap();
        let params = ParameterSet::new().with("theme_id", "7").with("content", "{}");
        let signed = api
            .sign_params(Method::Post, "https://infogr.am/service/v1/infographics", params)
            .unwrap();
        let keys: Vec<&str> = signed.iter().map(|p| p.key()).collect();
        assert_eq!(keys, vec!["theme_id", "content", "api_key", "api_sig"]);
        assert_eq!(signed.get("api_sig"), Some("uYFvdMYmtUuklUJQVjzs85id1rs="));
    }

    #[test]
    fn test_send_rejects_unknown_method_and_shape() {
        let api = InfogramApi::new("abc123", "s3cr3t").unwrap();
        let no_params: Vec<(String, String)> = Vec::new();

        let err = api.send("PATCH", "themes", no_params.clone(), "json").unwrap_err();
        assert!(matches!(err, InfogramError::UnsupportedMethod(_)));

        let err = api.send("GET", "themes", no_params, "xml").unwrap_err();
        assert!(matches!(err, InfogramError::UnsupportedShape(_)));
    }
}
