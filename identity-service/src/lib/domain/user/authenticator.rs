use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use auth::TokenKind;

use crate::domain::user::models::Principal;
use crate::domain::user::models::Username;
use crate::user::errors::AccountError;
use crate::user::ports::RequestAuthenticatorPort;
use crate::user::ports::UserRepository;

/// Resolves a bearer access token to the account it was issued for.
///
/// A token that cannot be trusted, or that names an account which no longer
/// exists or has been deactivated, is `Unauthenticated`. A valid token for an
/// account that has not verified its email is `Forbidden`.
pub struct RequestAuthenticator<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
}

impl<UR> RequestAuthenticator<UR>
where
    UR: UserRepository,
{
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }
}

#[async_trait]
impl<UR> RequestAuthenticatorPort for RequestAuthenticator<UR>
where
    UR: UserRepository,
{
    async fn authenticate(&self, access_token: &str) -> Result<Principal, AccountError> {
        let subject = self
            .authenticator
            .validate_token(access_token, TokenKind::Access)
            .map_err(|_| AccountError::Unauthenticated)?;

        let username = Username::from_stored(subject);

        let user = self
            .repository
            .find_by_username(&username)
            .await?
            .ok_or(AccountError::Unauthenticated)?;

        if !user.is_active {
            tracing::debug!(user_id = %user.id, "Rejected token for inactive account");
            return Err(AccountError::Unauthenticated);
        }

        if !user.is_verified {
            return Err(AccountError::Forbidden);
        }

        Ok(Principal::from(&user))
    }
}
