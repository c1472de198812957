use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::MessageData;
use crate::inbound::http::router::AppState;

pub async fn confirm_email(
    State(state): State<AppState>,
    Query(params): Query<TokenParams>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    state
        .auth_service
        .confirm_email(&params.token)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(StatusCode::OK, MessageData::new("Email verified")))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenParams {
    token: String,
}
