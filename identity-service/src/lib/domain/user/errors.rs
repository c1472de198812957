use thiserror::Error;

/// Error for Username validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("Username too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Username too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error(
        "Username contains invalid characters (only alphanumeric, underscore, and hyphen allowed)"
    )]
    InvalidCharacters,
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for outbound email delivery
#[derive(Debug, Clone, Error)]
pub enum EmailDispatchError {
    #[error("Failed to build email request: {0}")]
    InvalidRequest(String),

    #[error("Email provider rejected the message: {0}")]
    Rejected(String),

    #[error("Email provider unreachable: {0}")]
    ConnectionFailed(String),

    #[error("Email dispatch timeout: {0}")]
    Timeout(String),
}

/// Top-level error for all account and authentication operations
#[derive(Debug, Clone, Error)]
pub enum AccountError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    // Credential lifecycle errors
    #[error("Username or email already registered")]
    DuplicateIdentity,

    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Email not verified. Please check your inbox.")]
    EmailNotVerified,

    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,

    #[error("User not found")]
    UserNotFound,

    #[error("Could not validate credentials")]
    Unauthenticated,

    #[error("Account is not permitted to perform this operation")]
    Forbidden,

    // Infrastructure errors
    #[error("Credential processing failed: {0}")]
    Credential(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<auth::PasswordError> for AccountError {
    fn from(err: auth::PasswordError) -> Self {
        AccountError::Credential(err.to_string())
    }
}

impl From<auth::TokenError> for AccountError {
    fn from(err: auth::TokenError) -> Self {
        AccountError::Credential(err.to_string())
    }
}

impl From<auth::TokenRejected> for AccountError {
    fn from(_: auth::TokenRejected) -> Self {
        AccountError::InvalidOrExpiredToken
    }
}
