use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::AccountError;

/// Process-local user store.
///
/// Uniqueness of username and email is checked and the row inserted under a
/// single write lock, matching the unique constraints of the Postgres schema.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a stored account wholesale, including `is_active`.
    ///
    /// Stands in for the administrative tooling that owns activation state.
    pub async fn put(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: User) -> Result<User, AccountError> {
        let mut users = self.users.write().await;

        let collides = users.values().any(|existing| {
            existing.username == user.username
                || (user.email.is_some() && existing.email == user.email)
        });
        if collides {
            return Err(AccountError::DuplicateIdentity);
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, AccountError> {
        let users = self.users.read().await;
        Ok(users.values().find(|user| &user.username == username).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, AccountError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|user| user.email.as_ref() == Some(email))
            .cloned())
    }

    async fn update(&self, user: User) -> Result<(), AccountError> {
        let mut users = self.users.write().await;

        let stored = users.get_mut(&user.id).ok_or(AccountError::UserNotFound)?;
        stored.password_hash = user.password_hash;
        stored.is_verified = user.is_verified;

        Ok(())
    }
}
