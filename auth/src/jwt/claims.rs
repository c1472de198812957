use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::kind::TokenKind;
use super::kind::TokenLifetimes;

/// Signed claim set carried by every token.
///
/// The signature covers all four fields, so changing the subject, kind or
/// expiry of an issued token invalidates it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// Subject: username for access tokens, email address otherwise
    pub sub: String,

    /// Purpose of the token
    pub kind: TokenKind,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl TokenClaims {
    /// Build claims for `kind` issued at `now`, expiring after the kind's lifetime.
    pub fn new(
        kind: TokenKind,
        subject: impl ToString,
        now: DateTime<Utc>,
        lifetimes: &TokenLifetimes,
    ) -> Self {
        let expiration = now + lifetimes.ttl(kind);

        Self {
            sub: subject.to_string(),
            kind,
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        }
    }

    /// Check if token is expired.
    ///
    /// Expiry is strict: a token is dead from the second `exp` is reached,
    /// extended only by `leeway_seconds`.
    pub fn is_expired(&self, current_timestamp: i64, leeway_seconds: i64) -> bool {
        current_timestamp >= self.exp.saturating_add(leeway_seconds)
    }
}
