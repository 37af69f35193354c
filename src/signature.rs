//! Request signatures.
//!
//! The signing base string is
//! `pe(method) & pe(base_url) & pe(encode(sorted(params)))`, where `pe` is
//! [`percent_encode`]. It is signed with a keyed HMAC and base64-encoded.

use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;
use std::fmt;

use crate::error::{InfogramError, Result};
use crate::params::{encode, percent_encode, ParameterSet};

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;

/// Keyed digest used to sign requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureAlgorithm {
    /// HMAC-SHA1, the algorithm the Infogram API verifies.
    #[default]
    HmacSha1,
    /// HMAC-SHA256.
    HmacSha256,
}

impl SignatureAlgorithm {
    /// Digest length in bytes
    pub fn digest_len(&self) -> usize {
        match self {
            SignatureAlgorithm::HmacSha1 => 20,
            SignatureAlgorithm::HmacSha256 => 32,
        }
    }

    fn mac(&self, key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        match self {
            SignatureAlgorithm::HmacSha1 => {
                let mut mac = HmacSha1::new_from_slice(key)
                    .map_err(|e| InfogramError::Signing(format!("failed to create HMAC: {}", e)))?;
                mac.update(data);
                Ok(mac.finalize().into_bytes().to_vec())
            }
            SignatureAlgorithm::HmacSha256 => {
                let mut mac = HmacSha256::new_from_slice(key)
                    .map_err(|e| InfogramError::Signing(format!("failed to create HMAC: {}", e)))?;
                mac.update(data);
                Ok(mac.finalize().into_bytes().to_vec())
            }
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureAlgorithm::HmacSha1 => f.write_str("HmacSHA1"),
            SignatureAlgorithm::HmacSha256 => f.write_str("HmacSHA256"),
        }
    }
}

/// Computes request signatures from a shared secret.
#[derive(Clone)]
pub struct Signer {
    secret: String,
    algorithm: SignatureAlgorithm,
}

impl Signer {
    /// Create a signer using the given secret and algorithm.
    ///
    /// # Errors
    ///
    /// Returns `InfogramError::Signing` if the secret is empty.
    pub fn new(secret: impl Into<String>, algorithm: SignatureAlgorithm) -> Result<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(InfogramError::Signing("empty secret".to_string()));
        }
        Ok(Signer { secret, algorithm })
    }

    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    /// Build the signing base string.
    ///
    /// Parameters are sorted by key (stable) before encoding; `params` itself
    /// is left untouched.
    pub fn signing_base(method: &str, base_url: &str, params: &ParameterSet) -> String {
        let sorted = params.sorted();
        format!(
            "{}&{}&{}",
            percent_encode(method),
            percent_encode(base_url),
            percent_encode(&encode(&sorted))
        )
    }

    /// Sign a request and return the base64 signature.
    ///
    /// `params` must hold every parameter except the signature itself.
    pub fn sign(&self, method: &str, base_url: &str, params: &ParameterSet) -> Result<String> {
        let base = Self::signing_base(method, base_url, params);
        tracing::trace!(algorithm = %self.algorithm, base = %base, "signing request");

        let digest = self.algorithm.mac(self.secret.as_bytes(), base.as_bytes())?;
        if digest.len() != self.algorithm.digest_len() {
            return Err(InfogramError::Signing(format!(
                "{} produced {} bytes, expected {}",
                self.algorithm,
                digest.len(),
                self.algorithm.digest_len()
            )));
        }

        Ok(STANDARD.encode(digest))
    }
}

// Implement Debug manually to avoid exposing the secret
impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_params() -> ParameterSet {
        ParameterSet::new()
            .with("content", "{}")
            .with("theme_id", "7")
            .with("api_key", "abc123")
    }

    #[test]
    fn test_rfc2202_hmac_sha1() {
        let digest = SignatureAlgorithm::HmacSha1
            .mac(b"Jefe", b"what do ya want for nothing?")
            .unwrap();
        assert_eq!(STANDARD.encode(digest), "7/zfauXrL6LSdBbV8YTfnCWafHk=");
    }

    #[test]
    fn test_signing_base_sorts_and_double_encodes() {
        let base = Signer::signing_base(
            "POST",
            "https://infogr.am/service/v1/infographics",
            &post_params(),
        );
        assert_eq!(
            base,
            "POST&https%3A%2F%2Finfogr.am%2Fservice%2Fv1%2Finfographics\
             &api_key%3Dabc123%26content%3D%257B%257D%26theme_id%3D7"
        );
    }

    #[test]
    fn test_known_signatures() {
        let signer = Signer::new("s3cr3t", SignatureAlgorithm::HmacSha1).unwrap();
        let get = ParameterSet::new().with("api_key", "abc123");
        assert_eq!(
            signer
                .sign("GET", "https://api.example.com/infographics/42", &get)
                .unwrap(),
            "T4LCyNYgZKV+ptWe7giMEnUonTI="
        );
        assert_eq!(
            signer
                .sign("POST", "https://infogr.am/service/v1/infographics", &post_params())
                .unwrap(),
            "uYFvdMYmtUuklUJQVjzs85id1rs="
        );
    }

    #[test]
    fn test_alternate_algorithm() {
        let signer = Signer::new("s3cr3t", SignatureAlgorithm::HmacSha256).unwrap();
        let sig = signer
            .sign("POST", "https://infogr.am/service/v1/infographics", &post_params())
            .unwrap();
        assert_eq!(sig, "p25TeKa1S+pE3MNNAC5mc4rBsHEW/pFzreO5ZS8aknU=");
    }

    #[test]
    fn test_signature_is_deterministic_and_sensitive() {
        let signer = Signer::new("s3cr3t", SignatureAlgorithm::default()).unwrap();
        let url = "https://infogr.am/service/v1/infographics";
        let first = signer.sign("POST", url, &post_params()).unwrap();
        let second = signer.sign("POST", url, &post_params()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 28);

        let changed = ParameterSet::new()
            .with("content", "{}")
            .with("theme_id", "8")
            .with("api_key", "abc123");
        assert_ne!(first, signer.sign("POST", url, &changed).unwrap());
        assert_ne!(first, signer.sign("PUT", url, &post_params()).unwrap());
    }

    #[test]
    fn test_insertion_order_does_not_matter() {
        let signer = Signer::new("s3cr3t", SignatureAlgorithm::default()).unwrap();
        let reordered = ParameterSet::new()
            .with("api_key", "abc123")
            .with("theme_id", "7")
            .with("content", "{}");
        let url = "https://infogr.am/service/v1/infographics";
        assert_eq!(
            signer.sign("POST", url, &post_params()).unwrap(),
            signer.sign("POST", url, &reordered).unwrap()
        );
    }

    #[test]
    fn test_empty_secret_fails() {
        let err = Signer::new("", SignatureAlgorithm::HmacSha1).unwrap_err();
        assert!(matches!(err, InfogramError::Signing(_)));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let signer = Signer::new("s3cr3t", SignatureAlgorithm::HmacSha1).unwrap();
        let debug = format!("{:?}", signer);
        assert!(!debug.contains("s3cr3t"));
        assert!(debug.contains("redacted"));
    }
}
