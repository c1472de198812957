pub mod claims;
pub mod codec;
pub mod errors;
pub mod kind;

pub use claims::TokenClaims;
pub use codec::IssuedToken;
pub use codec::TokenCodec;
pub use errors::TokenError;
pub use errors::TokenRejected;
pub use kind::TokenKind;
pub use kind::TokenLifetimes;
