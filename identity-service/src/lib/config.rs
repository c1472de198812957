use std::env;

use auth::TokenCodec;
use auth::TokenLifetimes;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub password: PasswordConfig,
    pub email: EmailConfig,
    pub links: LinksConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Without a URL the service keeps users in memory
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_access_token_minutes")]
    pub access_token_minutes: i64,
    #[serde(default = "default_verify_email_minutes")]
    pub verify_email_minutes: i64,
    #[serde(default = "default_reset_password_minutes")]
    pub reset_password_minutes: i64,
    #[serde(default)]
    pub leeway_seconds: u32,
}

impl JwtConfig {
    pub fn lifetimes(&self) -> TokenLifetimes {
        TokenLifetimes::from_minutes(
            self.access_token_minutes,
            self.verify_email_minutes,
            self.reset_password_minutes,
        )
    }
}

// Secret stays out of Debug output
impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("access_token_minutes", &self.access_token_minutes)
            .field("verify_email_minutes", &self.verify_email_minutes)
            .field("reset_password_minutes", &self.reset_password_minutes)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

/// Argon2id cost parameters used for new hashes.
#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmailProvider {
    #[default]
    Log,
    Mailjet,
}

#[derive(Deserialize, Clone)]
pub struct EmailConfig {
    #[serde(default)]
    pub provider: EmailProvider,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub sender: String,
    pub sender_name: String,
    #[serde(default = "default_email_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_secret", &self.api_secret.as_ref().map(|_| "<redacted>"))
            .field("sender", &self.sender)
            .field("sender_name", &self.sender_name)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LinksConfig {
    /// Frontend origin that serves the verify and reset pages
    pub base_url: String,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("jwt.secret must be at least {min} bytes, got {actual}")]
    SecretTooShort { min: usize, actual: usize },

    #[error("jwt.{0} must be a positive number of minutes")]
    NonPositiveLifetime(&'static str),

    #[error("jwt.{name} must be at most {max} minutes")]
    LifetimeTooLong { name: &'static str, max: i64 },

    #[error("email.provider is mailjet but email.api_key or email.api_secret is missing")]
    MissingMailjetCredentials,

    #[error("links.base_url must not be empty")]
    MissingBaseUrl,
}

fn default_max_connections() -> u32 {
    5
}

fn default_access_token_minutes() -> i64 {
    TokenLifetimes::DEFAULT_ACCESS_MINUTES
}

fn default_verify_email_minutes() -> i64 {
    TokenLifetimes::DEFAULT_VERIFY_EMAIL_MINUTES
}

fn default_reset_password_minutes() -> i64 {
    TokenLifetimes::DEFAULT_RESET_PASSWORD_MINUTES
}

fn default_email_timeout_seconds() -> u64 {
    10
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (JWT__SECRET, DATABASE__URL, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        Ok(config)
    }

    /// Reject settings the service cannot run safely with.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let secret_len = self.jwt.secret.len();
        if secret_len < TokenCodec::MIN_SECRET_LEN {
            return Err(ConfigValidationError::SecretTooShort {
                min: TokenCodec::MIN_SECRET_LEN,
                actual: secret_len,
            });
        }

        for (name, minutes) in [
            ("access_token_minutes", self.jwt.access_token_minutes),
            ("verify_email_minutes", self.jwt.verify_email_minutes),
            ("reset_password_minutes", self.jwt.reset_password_minutes),
        ] {
            if minutes <= 0 {
                return Err(ConfigValidationError::NonPositiveLifetime(name));
            }
            if minutes > TokenLifetimes::MAX_MINUTES {
                return Err(ConfigValidationError::LifetimeTooLong {
                    name,
                    max: TokenLifetimes::MAX_MINUTES,
                });
            }
        }

        if self.email.provider == EmailProvider::Mailjet
            && (self.email.api_key.is_none() || self.email.api_secret.is_none())
        {
            return Err(ConfigValidationError::MissingMailjetCredentials);
        }

        if self.links.base_url.trim().is_empty() {
            return Err(ConfigValidationError::MissingBaseUrl);
        }

        Ok(())
    }
}
