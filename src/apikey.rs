use crate::error::{InfogramError, Result};
use crate::params::ParameterSet;
use crate::signature::{SignatureAlgorithm, Signer};

/// Name of the identity parameter
pub const API_KEY_PARAM: &str = "api_key";
/// Name of the signature parameter
pub const API_SIG_PARAM: &str = "api_sig";

/// ApiKey represents an API key with its secret for signing requests.
#[derive(Clone)]
pub struct ApiKey {
    /// API key identifier, sent as `api_key`
    pub key_id: String,
    signer: Signer,
}

impl ApiKey {
    /// Create a new ApiKey signing with HMAC-SHA1
    ///
    /// # Arguments
    /// * `key_id` - The API key identifier
    /// * `secret` - The shared secret, used as raw bytes
    pub fn new(key_id: impl Into<String>, secret: impl Into<String>) -> Result<Self> {
        Self::with_algorithm(key_id, secret, SignatureAlgorithm::default())
    }

    /// Create a new ApiKey signing with the given algorithm
    pub fn with_algorithm(
        key_id: impl Into<String>,
        secret: impl Into<String>,
        algorithm: SignatureAlgorithm,
    ) -> Result<Self> {
        let key_id = key_id.into();
        if key_id.is_empty() {
            return Err(InfogramError::Config("empty API key".to_string()));
        }
        let signer = Signer::new(secret, algorithm)?;
        Ok(ApiKey { key_id, signer })
    }

    /// Generate the signature for a request
    ///
    /// `params` must already contain `api_key`.
    pub fn generate_signature(
        &self,
        method: &str,
        base_url: &str,
        params: &ParameterSet,
    ) -> Result<String> {
        self.signer.sign(method, base_url, params)
    }

    /// Apply API key parameters to a parameter set
    ///
    /// Appends `api_key`, signs every parameter including it, then appends
    /// `api_sig`. Caller parameters keep their order.
    pub fn apply_params(
        &self,
        method: &str,
        base_url: &str,
        params: &mut ParameterSet,
    ) -> Result<()> {
        params.push(API_KEY_PARAM, self.key_id.clone());

        let signature = self.generate_signature(method, base_url, params)?;
        params.push(API_SIG_PARAM, signature);

        Ok(())
    }
}

// Implement Debug manually to avoid exposing the secret
impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKey")
            .field("key_id", &self.key_id)
            .field("algorithm", &self.signer.algorithm())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apikey_creation() {
        let api_key = ApiKey::new("abc123", "s3cr3t").unwrap();
        assert_eq!(api_key.key_id, "abc123");
        assert!(!format!("{:?}", api_key).contains("s3cr3t"));
    }

    #[test]
    fn test_apikey_rejects_empty_values() {
        assert!(matches!(
            ApiKey::new("", "s3cr3t"),
            Err(InfogramError::Config(_))
        ));
        assert!(matches!(
            ApiKey::new("abc123", ""),
            Err(InfogramError::Signing(_))
        ));
    }

    #[test]
    fn test_apply_params_appends_key_then_signature() {
        let api_key = ApiKey::new("abc123", "s3cr3t").unwrap();
        let mut params = ParameterSet::new().with("content", "{}").with("theme_id", "7");
        api_key
            .apply_params("POST", "https://infogr.am/service/v1/infographics", &mut params)
            .unwrap();

        let keys: Vec<&str> = params.iter().map(|p| p.key()).collect();
        assert_eq!(keys, vec!["content", "theme_id", "api_key", "api_sig"]);
        assert_eq!(params.get("api_key"), Some("abc123"));
        assert_eq!(params.get("api_sig"), Some("uYFvdMYmtUuklUJQVjzs85id1rs="));
    }

    #[test]
    fn test_signature_covers_api_key() {
        let url = "https://api.example.com/infographics/42";
        let mut first = ParameterSet::new();
        ApiKey::new("abc123", "s3cr3t")
            .unwrap()
            .apply_params("GET", url, &mut first)
            .unwrap();
        let mut second = ParameterSet::new();
        ApiKey::new("abc124", "s3cr3t")
            .unwrap()
            .apply_params("GET", url, &mut second)
            .unwrap();

        assert_eq!(first.get("api_sig"), Some("T4LCyNYgZKV+ptWe7giMEnUonTI="));
        assert_ne!(first.get("api_sig"), second.get("api_sig"));
    }
}
