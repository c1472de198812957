use async_trait::async_trait;

use crate::domain::user::models::AccessGrant;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::EmailTemplate;
use crate::domain::user::models::Principal;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::User;
use crate::user::errors::AccountError;
use crate::user::errors::EmailDispatchError;
use crate::user::models::Username;

/// Port for account and credential lifecycle operations.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new, unverified account and mail a verification link.
    ///
    /// # Arguments
    /// * `command` - Validated command containing username, email, and password
    ///
    /// # Returns
    /// Created user entity
    ///
    /// # Errors
    /// * `DuplicateIdentity` - Username or email is already registered
    /// * `Credential` - Password hashing failed
    /// * `Unavailable` / `DatabaseError` - Store operation failed
    async fn register(&self, command: RegisterCommand) -> Result<User, AccountError>;

    /// Exchange credentials for an access token.
    ///
    /// # Arguments
    /// * `identifier` - Username, or email address when no username matches
    /// * `password` - Plaintext password
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown identity, inactive account or wrong password
    /// * `EmailNotVerified` - Credentials are correct but the email is unverified
    async fn login(&self, identifier: &str, password: &str) -> Result<AccessGrant, AccountError>;

    /// Redeem an email verification token.
    ///
    /// Redeeming for an already verified account succeeds without changes.
    ///
    /// # Errors
    /// * `InvalidOrExpiredToken` - Token is forged, expired, malformed or of another kind
    /// * `UserNotFound` - No account holds the token's email
    async fn confirm_email(&self, token: &str) -> Result<(), AccountError>;

    /// Mail a password reset link if the address belongs to an account.
    ///
    /// Reports success either way.
    async fn request_password_reset(&self, email: &EmailAddress) -> Result<(), AccountError>;

    /// Redeem a password reset token and replace the stored credential.
    ///
    /// # Errors
    /// * `InvalidOrExpiredToken` - Token is forged, expired, malformed or of another kind
    /// * `UserNotFound` - No account holds the token's email
    async fn confirm_password_reset(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<(), AccountError>;
}

/// Port resolving a presented access token to a principal.
#[async_trait]
pub trait RequestAuthenticatorPort: Send + Sync + 'static {
    /// Resolve a bearer token to the principal it was issued to.
    ///
    /// # Errors
    /// * `Unauthenticated` - Token invalid, account unknown or inactive
    /// * `Forbidden` - Account exists and is active but its email is unverified
    async fn authenticate(&self, access_token: &str) -> Result<Principal, AccountError>;
}

/// Persistence operations for the user aggregate.
///
/// Implementations must enforce uniqueness of username and email; that
/// constraint, not the service's pre-check, is what prevents duplicate
/// registrations under concurrency.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Errors
    /// * `DuplicateIdentity` - Username or email is already taken
    /// * `Unavailable` / `DatabaseError` - Store operation failed
    async fn insert(&self, user: User) -> Result<User, AccountError>;

    /// Retrieve user by username.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, AccountError>;

    /// Retrieve user by email address.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, AccountError>;

    /// Persist the credential hash and verification flag of `user`.
    ///
    /// Activation state is administered outside this service and is not written.
    ///
    /// # Errors
    /// * `UserNotFound` - User does not exist
    /// * `Unavailable` / `DatabaseError` - Store operation failed
    async fn update(&self, user: User) -> Result<(), AccountError>;
}

/// Outbound transactional email.
#[async_trait]
pub trait EmailSender: Send + Sync + 'static {
    /// Send `template` to `to`, embedding `link`.
    ///
    /// # Errors
    /// * `InvalidRequest` - Message could not be built
    /// * `Rejected` - Provider refused the message
    /// * `ConnectionFailed` - Provider unreachable
    /// * `Timeout` - Provider did not answer in time
    async fn send(
        &self,
        to: &EmailAddress,
        template: EmailTemplate,
        link: &str,
    ) -> Result<(), EmailDispatchError>;
}
