use thiserror::Error;

/// Error type for token issuance.
#[derive(Debug, Clone, Error)]
pub enum TokenError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),
}

/// Rejection of a presented token.
///
/// Deliberately carries no reason: forged, expired, malformed and
/// wrong-purpose tokens all look the same to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Token is invalid or expired")]
pub struct TokenRejected;

/// Why a token was rejected. Only ever logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RejectionReason {
    Malformed,
    BadSignature,
    WrongKind,
    Expired,
}
