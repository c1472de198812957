use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::AccountError;

const USER_COLUMNS: &str = "id, username, email, password_hash, is_active, is_verified, created_at";

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Stored values bypass the registration rules; rows written before
    /// those rules existed still load.
    fn row_to_user(row: PgRow) -> Result<User, AccountError> {
        let email: Option<String> = row.try_get("email").map_err(map_sqlx_error)?;

        Ok(User {
            id: UserId(row.try_get("id").map_err(map_sqlx_error)?),
            username: Username::from_stored(row.try_get("username").map_err(map_sqlx_error)?),
            email: email.map(EmailAddress::from_stored),
            password_hash: row.try_get("password_hash").map_err(map_sqlx_error)?,
            is_active: row.try_get("is_active").map_err(map_sqlx_error)?,
            is_verified: row.try_get("is_verified").map_err(map_sqlx_error)?,
            created_at: row.try_get("created_at").map_err(map_sqlx_error)?,
        })
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<Option<User>, AccountError> {
        let query = format!("SELECT {} FROM users WHERE {} = $1", USER_COLUMNS, column);

        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(Self::row_to_user).transpose()
    }
}

/// Connection-level failures are `Unavailable`; everything else is a
/// database error.
fn map_sqlx_error(e: sqlx::Error) -> AccountError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            AccountError::Unavailable(e.to_string())
        }
        _ => AccountError::DatabaseError(e.to_string()),
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn insert(&self, user: User) -> Result<User, AccountError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, is_active, is_verified, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id.0)
        .bind(user.username.as_str())
        .bind(user.email.as_ref().map(|email| email.as_str()))
        .bind(&user.password_hash)
        .bind(user.is_active)
        .bind(user.is_verified)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation()
                    && matches!(
                        db_err.constraint(),
                        Some("users_username_key") | Some("users_email_key")
                    )
                {
                    return AccountError::DuplicateIdentity;
                }
            }
            map_sqlx_error(e)
        })?;

        Ok(user)
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, AccountError> {
        self.find_one("username", username.as_str()).await
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, AccountError> {
        self.find_one("email", email.as_str()).await
    }

    async fn update(&self, user: User) -> Result<(), AccountError> {
        // is_active is administered elsewhere and never written here
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, is_verified = $3
            WHERE id = $1
            "#,
        )
        .bind(user.id.0)
        .bind(&user.password_hash)
        .bind(user.is_verified)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AccountError::UserNotFound);
        }

        Ok(())
    }
}
