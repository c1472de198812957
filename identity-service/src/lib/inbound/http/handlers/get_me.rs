use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;
use super::PrincipalData;
use crate::domain::user::models::Principal;

/// Echo the authenticated principal resolved by the auth middleware.
pub async fn get_me(
    Extension(principal): Extension<Principal>,
) -> Result<ApiSuccess<PrincipalData>, ApiError> {
    Ok(ApiSuccess::new(StatusCode::OK, (&principal).into()))
}
