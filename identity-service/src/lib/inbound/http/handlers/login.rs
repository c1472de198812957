use axum::extract::State;
use axum::http::StatusCode;
use axum::Form;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::user::models::AccessGrant;
use crate::inbound::http::router::AppState;

/// Log in with a username or email address.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<ApiSuccess<AccessTokenData>, ApiError> {
    state
        .auth_service
        .login(&body.identifier, &body.password)
        .await
        .map_err(ApiError::from)
        .map(|ref grant| ApiSuccess::new(StatusCode::OK, grant.into()))
}

/// Same as `login`, for clients speaking the OAuth2 password form.
pub async fn token(
    State(state): State<AppState>,
    Form(form): Form<PasswordForm>,
) -> Result<ApiSuccess<AccessTokenData>, ApiError> {
    state
        .auth_service
        .login(&form.username, &form.password)
        .await
        .map_err(ApiError::from)
        .map(|ref grant| ApiSuccess::new(StatusCode::OK, grant.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    identifier: String,
    password: String,
}

/// `username` may hold either a username or an email address.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PasswordForm {
    username: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessTokenData {
    pub access_token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserData,
}

impl From<&AccessGrant> for AccessTokenData {
    fn from(grant: &AccessGrant) -> Self {
        Self {
            access_token: grant.access_token.token.clone(),
            token_type: "bearer".to_string(),
            expires_at: grant.access_token.expires_at,
            user: (&grant.user).into(),
        }
    }
}
