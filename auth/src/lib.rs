//! Authentication utilities library
//!
//! Provides reusable authentication infrastructure for services:
//! - Password hashing (Argon2id)
//! - Typed, time-bound token issuance and verification (HS256 JWT)
//! - Authentication coordination
//!
//! Each service defines its own authentication traits and adapts these implementations.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! ```
//!
//! ## Tokens
//! ```
//! use auth::{TokenCodec, TokenKind, TokenLifetimes};
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!", TokenLifetimes::default());
//! let issued = codec.issue(TokenKind::VerifyEmail, "alice@example.com").unwrap();
//! let subject = codec.verify(&issued.token, TokenKind::VerifyEmail).unwrap();
//! assert_eq!(subject, "alice@example.com");
//!
//! // A verification token is not an access token
//! assert!(codec.verify(&issued.token, TokenKind::Access).is_err());
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{Authenticator, TokenKind, TokenLifetimes};
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!", TokenLifetimes::default());
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify, then issue an access token
//! assert!(auth.verify_password("password123", &hash));
//! let issued = auth.issue_token(TokenKind::Access, "alice").unwrap();
//!
//! // Validate token
//! let username = auth.validate_token(&issued.token, TokenKind::Access).unwrap();
//! assert_eq!(username, "alice");
//! ```

pub mod authenticator;
pub mod clock;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::Authenticator;
pub use clock::Clock;
pub use clock::ManualClock;
pub use clock::SystemClock;
pub use jwt::IssuedToken;
pub use jwt::TokenClaims;
pub use jwt::TokenCodec;
pub use jwt::TokenError;
pub use jwt::TokenKind;
pub use jwt::TokenLifetimes;
pub use jwt::TokenRejected;
pub use password::PasswordError;
pub use password::PasswordHasher;
