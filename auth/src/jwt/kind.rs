use std::fmt;

use chrono::Duration;
use serde::Deserialize;
use serde::Serialize;

/// Purpose a token was issued for.
///
/// Carried inside the signed claims; a token presented where another kind
/// is expected is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Session credential presented on authenticated requests
    Access,
    /// Email address ownership proof sent after registration
    VerifyEmail,
    /// One-off authorization to replace a forgotten password
    ResetPassword,
}

impl TokenKind {
    pub const ALL: [TokenKind; 3] = [
        TokenKind::Access,
        TokenKind::VerifyEmail,
        TokenKind::ResetPassword,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::VerifyEmail => "verify_email",
            TokenKind::ResetPassword => "reset_password",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed time-to-live per token kind.
///
/// Set once when the codec is built; callers never choose a lifetime
/// when issuing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub access: Duration,
    pub verify_email: Duration,
    pub reset_password: Duration,
}

impl TokenLifetimes {
    pub const DEFAULT_ACCESS_MINUTES: i64 = 60;
    pub const DEFAULT_VERIFY_EMAIL_MINUTES: i64 = 30;
    pub const DEFAULT_RESET_PASSWORD_MINUTES: i64 = 30;
    /// Longest lifetime any kind may be configured with (one year).
    pub const MAX_MINUTES: i64 = 60 * 24 * 366;

    pub fn from_minutes(access: i64, verify_email: i64, reset_password: i64) -> Self {
        Self {
            access: Duration::minutes(access),
            verify_email: Duration::minutes(verify_email),
            reset_password: Duration::minutes(reset_password),
        }
    }

    /// Lifetime for tokens of `kind`.
    pub fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access,
            TokenKind::VerifyEmail => self.verify_email,
            TokenKind::ResetPassword => self.reset_password,
        }
    }
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self::from_minutes(
            Self::DEFAULT_ACCESS_MINUTES,
            Self::DEFAULT_VERIFY_EMAIL_MINUTES,
            Self::DEFAULT_RESET_PASSWORD_MINUTES,
        )
    }
}
