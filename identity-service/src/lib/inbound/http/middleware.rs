use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use super::handlers::ApiError;
use crate::inbound::http::router::AppState;
use crate::user::errors::AccountError;

/// Middleware that resolves the bearer token to a `Principal` and stores it
/// in request extensions.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    // Owned so the request is not borrowed across the await
    let token = extract_bearer_token(&req)
        .map(str::to_string)
        .ok_or_else(|| {
            tracing::debug!("Missing or malformed Authorization header");
            ApiError::from(AccountError::Unauthenticated).into_response()
        })?;

    let principal = state
        .request_authenticator
        .authenticate(&token)
        .await
        .map_err(|e| ApiError::from(e).into_response())?;

    tracing::debug!(user_id = %principal.id, "Request authenticated");

    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

fn extract_bearer_token(req: &Request) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
