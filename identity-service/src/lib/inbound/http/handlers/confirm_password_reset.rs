use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::MessageData;
use crate::inbound::http::router::AppState;

pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(body): Json<ConfirmPasswordResetRequest>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    if body.new_password.is_empty() {
        return Err(ApiError::UnprocessableEntity(
            "Password must not be empty".to_string(),
        ));
    }

    state
        .auth_service
        .confirm_password_reset(&body.token, &body.new_password)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(StatusCode::OK, MessageData::new("Password has been reset")))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConfirmPasswordResetRequest {
    token: String,
    new_password: String,
}
