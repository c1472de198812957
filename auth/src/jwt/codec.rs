use std::sync::Arc;

use chrono::DateTime;
use chrono::SubsecRound;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::TokenClaims;
use super::errors::RejectionReason;
use super::errors::TokenError;
use super::errors::TokenRejected;
use super::kind::TokenKind;
use super::kind::TokenLifetimes;
use crate::clock::Clock;
use crate::clock::SystemClock;

/// A freshly signed token together with its validity window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub kind: TokenKind,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies typed, time-bound tokens.
///
/// Uses HS256 (HMAC with SHA-256) with a single shared secret for every
/// token kind. The kind is part of the signed claims, which is what keeps
/// a reset token from being accepted as an access token.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    lifetimes: TokenLifetimes,
    leeway_seconds: i64,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    /// Minimum accepted secret length in bytes for HS256.
    pub const MIN_SECRET_LEN: usize = 32;

    /// Create a new token codec with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    /// * `lifetimes` - Fixed time-to-live per token kind
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8], lifetimes: TokenLifetimes) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            lifetimes,
            leeway_seconds: 0,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the time source used for issuance and expiry checks.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Accept tokens up to `seconds` past their expiry.
    ///
    /// Zero (the default) means strict expiry. Only worth raising when
    /// issuing and verifying nodes do not share a clock.
    pub fn with_leeway(mut self, seconds: u32) -> Self {
        self.leeway_seconds = i64::from(seconds);
        self
    }

    /// Issue a signed token of `kind` for `subject`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue(&self, kind: TokenKind, subject: &str) -> Result<IssuedToken, TokenError> {
        let now = self.clock.now().trunc_subsecs(0);
        let claims = TokenClaims::new(kind, subject, now, &self.lifetimes);
        let header = Header::new(self.algorithm);

        let token = encode(&header, &claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))?;

        Ok(IssuedToken {
            token,
            kind,
            issued_at: now,
            expires_at: now + self.lifetimes.ttl(kind),
        })
    }

    /// Verify a token and return its subject.
    ///
    /// Checks, in order: structure, signature, kind, expiry. Every failure
    /// collapses into the same `TokenRejected`; the actual reason is only
    /// written to the debug log.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<String, TokenRejected> {
        self.check(token, expected)
            .map(|claims| claims.sub)
            .map_err(|reason| {
                tracing::debug!(?reason, expected = %expected, "Token rejected");
                TokenRejected
            })
    }

    fn check(&self, token: &str, expected: TokenKind) -> Result<TokenClaims, RejectionReason> {
        let mut validation = Validation::new(self.algorithm);
        // Expiry is checked below against the injected clock
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => RejectionReason::BadSignature,
                _ => RejectionReason::Malformed,
            })?
            .claims;

        if claims.kind != expected {
            return Err(RejectionReason::WrongKind);
        }

        if claims.is_expired(self.clock.now().timestamp(), self.leeway_seconds) {
            return Err(RejectionReason::Expired);
        }

        Ok(claims)
    }
}
