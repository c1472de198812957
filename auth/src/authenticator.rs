use std::sync::Arc;

use crate::clock::Clock;
use crate::jwt::IssuedToken;
use crate::jwt::TokenCodec;
use crate::jwt::TokenError;
use crate::jwt::TokenKind;
use crate::jwt::TokenLifetimes;
use crate::jwt::TokenRejected;
use crate::password::PasswordError;
use crate::password::PasswordHasher;
use crate::password::DECOY_HASH;

/// Authentication coordinator combining password verification and token handling.
///
/// Pairs password hashing with the token codec behind one handle.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_codec: TokenCodec,
}

impl Authenticator {
    /// Create a new authenticator with default hashing cost.
    ///
    /// # Arguments
    /// * `token_secret` - Secret key for token signing
    /// * `lifetimes` - Time-to-live per token kind
    pub fn new(token_secret: &[u8], lifetimes: TokenLifetimes) -> Self {
        Self::from_parts(PasswordHasher::new(), TokenCodec::new(token_secret, lifetimes))
    }

    /// Assemble an authenticator from an already configured hasher and codec.
    pub fn from_parts(password_hasher: PasswordHasher, token_codec: TokenCodec) -> Self {
        Self {
            password_hasher,
            token_codec,
        }
    }

    /// Replace the codec's time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.token_codec = self.token_codec.with_clock(clock);
        self
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a plaintext password against a stored hash.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> bool {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Spend the same effort as a real password check, then fail.
    ///
    /// Used when the claimed identity does not exist so that timing does not
    /// reveal it.
    pub fn reject_unknown_identity(&self, password: &str) {
        let _ = self.password_hasher.verify(password, DECOY_HASH);
    }

    /// Issue a token of any kind without password verification.
    ///
    /// # Errors
    /// * `TokenError` - Token generation failed
    pub fn issue_token(&self, kind: TokenKind, subject: &str) -> Result<IssuedToken, TokenError> {
        self.token_codec.issue(kind, subject)
    }

    /// Validate a token of the expected kind and return its subject.
    pub fn validate_token(&self, token: &str, expected: TokenKind) -> Result<String, TokenRejected> {
        self.token_codec.verify(token, expected)
    }
}
