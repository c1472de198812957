use axum::http::header;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::domain::user::models::Principal;
use crate::domain::user::models::User;
use crate::user::errors::AccountError;

pub mod confirm_email;
pub mod confirm_password_reset;
pub mod get_me;
pub mod login;
pub mod register;
pub mod request_password_reset;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    ServiceUnavailable(String),
    UnprocessableEntity(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Unauthorized(String),
    Forbidden(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
        };

        let mut response =
            (status, Json(ApiResponseBody::new_error(status, message))).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::InvalidUsername(_)
            | AccountError::InvalidEmail(_) => ApiError::UnprocessableEntity(err.to_string()),
            AccountError::DuplicateIdentity => ApiError::Conflict(err.to_string()),
            AccountError::InvalidCredentials | AccountError::Unauthenticated => {
                ApiError::Unauthorized(err.to_string())
            }
            AccountError::EmailNotVerified | AccountError::Forbidden => {
                ApiError::Forbidden(err.to_string())
            }
            AccountError::InvalidOrExpiredToken => ApiError::BadRequest(err.to_string()),
            AccountError::UserNotFound => ApiError::NotFound(err.to_string()),
            AccountError::Unavailable(ref detail) => {
                tracing::error!(error = %detail, "User store unavailable");
                ApiError::ServiceUnavailable("Service temporarily unavailable".to_string())
            }
            AccountError::Credential(ref detail)
            | AccountError::DatabaseError(ref detail)
            | AccountError::Unknown(ref detail) => {
                tracing::error!(error = %detail, "Request failed");
                ApiError::InternalServerError("Internal server error".to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}

/// Plain acknowledgement for operations with nothing else to return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageData {
    pub message: String,
}

impl MessageData {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Public view of an account. Never carries the credential hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserData {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.as_str().to_string(),
            email: user.email.as_ref().map(|email| email.as_str().to_string()),
            is_verified: user.is_verified,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrincipalData {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
}

impl From<&Principal> for PrincipalData {
    fn from(principal: &Principal) -> Self {
        Self {
            id: principal.id.to_string(),
            username: principal.username.as_str().to_string(),
            email: principal
                .email
                .as_ref()
                .map(|email| email.as_str().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AccountError::DuplicateIdentity, StatusCode::CONFLICT),
            (AccountError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AccountError::EmailNotVerified, StatusCode::FORBIDDEN),
            (AccountError::InvalidOrExpiredToken, StatusCode::BAD_REQUEST),
            (AccountError::UserNotFound, StatusCode::NOT_FOUND),
            (AccountError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (AccountError::Forbidden, StatusCode::FORBIDDEN),
            (
                AccountError::Unavailable("pool timed out".to_string()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                AccountError::Credential("bad params".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn test_unauthorized_carries_bearer_challenge() {
        let response = ApiError::from(AccountError::Unauthenticated).into_response();

        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE),
            Some(&HeaderValue::from_static("Bearer"))
        );
    }

    #[test]
    fn test_internal_details_are_not_exposed() {
        let err = ApiError::from(AccountError::Unavailable(
            "connection refused to 10.0.0.5".to_string(),
        ));

        assert_eq!(
            err,
            ApiError::ServiceUnavailable("Service temporarily unavailable".to_string())
        );
    }
}
