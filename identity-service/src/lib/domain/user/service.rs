use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use auth::TokenKind;
use tracing::Instrument;

use crate::domain::user::models::AccessGrant;
use crate::domain::user::models::ActionLinks;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::EmailTemplate;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::Username;
use crate::user::errors::AccountError;
use crate::user::ports::AuthServicePort;
use crate::user::ports::EmailSender;
use crate::user::ports::UserRepository;

/// Domain service implementation for the credential lifecycle.
///
/// Concrete implementation of AuthServicePort with dependency injection.
/// Holds no mutable state of its own; every durable change goes through
/// the repository.
pub struct AuthService<UR, ES>
where
    UR: UserRepository,
    ES: EmailSender + ?Sized,
{
    repository: Arc<UR>,
    email_sender: Arc<ES>,
    authenticator: Arc<Authenticator>,
    links: ActionLinks,
}

impl<UR, ES> AuthService<UR, ES>
where
    UR: UserRepository,
    ES: EmailSender + ?Sized,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `email_sender` - Transactional email implementation
    /// * `authenticator` - Password hashing and token signing
    /// * `links` - Builder for the links embedded in emails
    pub fn new(
        repository: Arc<UR>,
        email_sender: Arc<ES>,
        authenticator: Arc<Authenticator>,
        links: ActionLinks,
    ) -> Self {
        Self {
            repository,
            email_sender,
            authenticator,
            links,
        }
    }

    /// Hash on the blocking pool; Argon2 is deliberately slow.
    async fn hash_password(&self, password: String) -> Result<String, AccountError> {
        let authenticator = Arc::clone(&self.authenticator);

        tokio::task::spawn_blocking(move || authenticator.hash_password(&password))
            .await
            .map_err(|e| AccountError::Unknown(format!("Password hashing task failed: {}", e)))?
            .map_err(AccountError::from)
    }

    /// Check `password` against `stored_hash` on the blocking pool.
    ///
    /// With no stored hash the same amount of work is done against a decoy
    /// and the result is always false.
    async fn verify_password(
        &self,
        password: &str,
        stored_hash: Option<&str>,
    ) -> Result<bool, AccountError> {
        let authenticator = Arc::clone(&self.authenticator);
        let password = password.to_string();
        let stored_hash = stored_hash.map(str::to_string);

        tokio::task::spawn_blocking(move || match stored_hash {
            Some(hash) => authenticator.verify_password(&password, &hash),
            None => {
                authenticator.reject_unknown_identity(&password);
                false
            }
        })
        .await
        .map_err(|e| AccountError::Unknown(format!("Password verification task failed: {}", e)))
    }

    /// Username first, then email. First match wins.
    ///
    /// Lookups use the identifier as given: existing accounts may predate
    /// the registration rules.
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>, AccountError> {
        if identifier.is_empty() {
            return Ok(None);
        }

        let username = Username::from_stored(identifier.to_string());
        if let Some(user) = self.repository.find_by_username(&username).await? {
            return Ok(Some(user));
        }

        if !identifier.contains('@') {
            return Ok(None);
        }

        let email = EmailAddress::from_stored(identifier.to_string());
        self.repository.find_by_email(&email).await
    }

    /// Resolve the email address a verification or reset token was issued for.
    async fn redeem(&self, token: &str, kind: TokenKind) -> Result<User, AccountError> {
        let subject = self.authenticator.validate_token(token, kind)?;
        let email = EmailAddress::from_stored(subject);

        self.repository
            .find_by_email(&email)
            .await?
            .ok_or(AccountError::UserNotFound)
    }

    /// Send an email without holding up the caller.
    ///
    /// Delivery failures are logged and otherwise ignored.
    fn dispatch(&self, to: EmailAddress, template: EmailTemplate, link: String) {
        let email_sender = Arc::clone(&self.email_sender);

        tokio::spawn(
            async move {
                match email_sender.send(&to, template, &link).await {
                    Ok(()) => tracing::info!(template = ?template, "Email dispatched"),
                    Err(e) => tracing::error!(
                        template = ?template,
                        error = %e,
                        "Failed to dispatch email"
                    ),
                }
            }
            .instrument(tracing::Span::current()),
        );
    }
}

#[async_trait]
impl<UR, ES> AuthServicePort for AuthService<UR, ES>
where
    UR: UserRepository,
    ES: EmailSender + ?Sized,
{
    async fn register(&self, command: RegisterCommand) -> Result<User, AccountError> {
        // Fast path only; the store's unique constraints are the real guard
        if self
            .repository
            .find_by_username(&command.username)
            .await?
            .is_some()
            || self.repository.find_by_email(&command.email).await?.is_some()
        {
            return Err(AccountError::DuplicateIdentity);
        }

        let password_hash = self.hash_password(command.password).await?;
        let email = command.email.clone();

        let user = self
            .repository
            .insert(User::register(command.username, command.email, password_hash))
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");

        match self
            .authenticator
            .issue_token(TokenKind::VerifyEmail, email.as_str())
        {
            Ok(issued) => {
                let link = self.links.verify_email(&issued.token);
                self.dispatch(email, EmailTemplate::Verify, link);
            }
            Err(e) => {
                // The account stays unverified; the user can ask for a new link
                tracing::error!(user_id = %user.id, error = %e, "Failed to issue verification token");
            }
        }

        Ok(user)
    }

    async fn login(&self, identifier: &str, password: &str) -> Result<AccessGrant, AccountError> {
        let user = self
            .find_by_identifier(identifier)
            .await?
            .filter(|user| user.is_active);

        let Some(user) = user else {
            self.verify_password(password, None).await?;
            tracing::debug!("Login rejected: unknown or inactive identity");
            return Err(AccountError::InvalidCredentials);
        };

        if !self
            .verify_password(password, Some(user.password_hash.as_str()))
            .await?
        {
            tracing::debug!(user_id = %user.id, "Login rejected: password mismatch");
            return Err(AccountError::InvalidCredentials);
        }

        if !user.is_verified {
            return Err(AccountError::EmailNotVerified);
        }

        let access_token = self
            .authenticator
            .issue_token(TokenKind::Access, user.username.as_str())?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(AccessGrant { user, access_token })
    }

    async fn confirm_email(&self, token: &str) -> Result<(), AccountError> {
        let mut user = self.redeem(token, TokenKind::VerifyEmail).await?;

        if user.is_verified {
            tracing::debug!(user_id = %user.id, "Email already verified");
            return Ok(());
        }

        user.is_verified = true;
        let user_id = user.id;
        self.repository.update(user).await?;

        tracing::info!(user_id = %user_id, "Email verified");

        Ok(())
    }

    async fn request_password_reset(&self, email: &EmailAddress) -> Result<(), AccountError> {
        let Some(user) = self.repository.find_by_email(email).await? else {
            tracing::info!("Password reset requested for unregistered email");
            return Ok(());
        };

        match self
            .authenticator
            .issue_token(TokenKind::ResetPassword, email.as_str())
        {
            Ok(issued) => {
                let link = self.links.reset_password(&issued.token);
                self.dispatch(email.clone(), EmailTemplate::Reset, link);
                tracing::info!(user_id = %user.id, "Password reset requested");
            }
            Err(e) => {
                tracing::error!(user_id = %user.id, error = %e, "Failed to issue reset token");
            }
        }

        Ok(())
    }

    async fn confirm_password_reset(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<(), AccountError> {
        let mut user = self.redeem(token, TokenKind::ResetPassword).await?;

        user.password_hash = self.hash_password(new_password.to_string()).await?;
        let user_id = user.id;
        self.repository.update(user).await?;

        tracing::info!(user_id = %user_id, "Password reset completed");

        Ok(())
    }
}
