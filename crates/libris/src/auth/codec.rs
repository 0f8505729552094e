//! Signed, time-bounded credential encoding.
//!
//! Credentials are HS256 JWTs. Expiry is checked with zero leeway: a token
//! presented one second after `exp` is rejected even if its signature is
//! valid.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use super::Claims;

/// Codec failures.
///
/// `InvalidSignature`, `Expired` and `Malformed` all surface to clients as
/// one unauthenticated outcome; the distinction exists for logs.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("signing key unavailable")]
    MissingKey,

    #[error("failed to sign credential: {0}")]
    Signing(String),

    #[error("credential signature does not verify")]
    InvalidSignature,

    #[error("credential expired")]
    Expired,

    #[error("malformed credential: {0}")]
    Malformed(String),
}

impl CodecError {
    /// True for failures caused by the presented credential rather than by
    /// the server's own configuration.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            CodecError::InvalidSignature | CodecError::Expired | CodecError::Malformed(_)
        )
    }
}

/// A freshly signed credential together with the claims it encodes.
#[derive(Debug, Clone)]
pub struct Credential {
    pub token: String,
    pub claims: Claims,
}

/// Encodes and decodes credentials with a shared HMAC secret.
#[derive(Clone)]
pub struct CredentialCodec {
    encoding_key: Option<EncodingKey>,
    decoding_key: Option<DecodingKey>,
    lifetime: Duration,
}

impl CredentialCodec {
    /// A codec without a secret refuses to sign or verify anything and
    /// reports `MissingKey`.
    pub fn new(secret: Option<&str>, lifetime: Duration) -> Self {
        Self {
            encoding_key: secret.map(|s| EncodingKey::from_secret(s.as_bytes())),
            decoding_key: secret.map(|s| DecodingKey::from_secret(s.as_bytes())),
            lifetime,
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Sign `claims`, stamping `iat = now` and `exp = now + lifetime`.
    pub fn encode(&self, claims: Claims) -> Result<Credential, CodecError> {
        self.encode_at(claims, Utc::now().timestamp())
    }

    /// Sign `claims` as if issued at `issued_at` (Unix seconds).
    pub fn encode_at(&self, mut claims: Claims, issued_at: i64) -> Result<Credential, CodecError> {
        let key = self.encoding_key.as_ref().ok_or(CodecError::MissingKey)?;

        claims.iat = issued_at;
        claims.exp = issued_at + self.lifetime.as_secs() as i64;

        let token = encode(&Header::new(Algorithm::HS256), &claims, key)
            .map_err(|e| CodecError::Signing(e.to_string()))?;

        Ok(Credential { token, claims })
    }

    /// Verify signature and expiry, returning the embedded claims.
    pub fn decode(&self, token: &str) -> Result<Claims, CodecError> {
        let key = self.decoding_key.as_ref().ok_or(CodecError::MissingKey)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.set_required_spec_claims(&["exp"]);

        let data = decode::<Claims>(token, key, &validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => CodecError::Expired,
            ErrorKind::InvalidSignature => CodecError::InvalidSignature,
            _ => CodecError::Malformed(e.to_string()),
        })?;

        Ok(data.claims)
    }
}

impl std::fmt::Debug for CredentialCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCodec")
            .field("has_key", &self.encoding_key.is_some())
            .field("lifetime", &self.lifetime)
            .finish()
    }
}
