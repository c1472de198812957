use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::MessageData;
use crate::domain::user::models::EmailAddress;
use crate::inbound::http::router::AppState;

const ACCEPTED_MESSAGE: &str =
    "If an account exists for this address, a password reset link has been sent";

pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(body): Json<PasswordResetRequest>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    let email = EmailAddress::new(body.email)
        .map_err(|e| ApiError::UnprocessableEntity(format!("Invalid email: {}", e)))?;

    state
        .auth_service
        .request_password_reset(&email)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(StatusCode::ACCEPTED, MessageData::new(ACCEPTED_MESSAGE)))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PasswordResetRequest {
    email: String,
}
