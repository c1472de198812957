use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::confirm_email::confirm_email;
use super::handlers::confirm_password_reset::confirm_password_reset;
use super::handlers::get_me::get_me;
use super::handlers::login::login;
use super::handlers::login::token;
use super::handlers::register::register;
use super::handlers::request_password_reset::request_password_reset;
use super::middleware::authenticate as auth_middleware;
use crate::domain::user::ports::AuthServicePort;
use crate::domain::user::ports::RequestAuthenticatorPort;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthServicePort>,
    pub request_authenticator: Arc<dyn RequestAuthenticatorPort>,
}

pub fn create_router(
    auth_service: Arc<dyn AuthServicePort>,
    request_authenticator: Arc<dyn RequestAuthenticatorPort>,
) -> Router {
    let state = AppState {
        auth_service,
        request_authenticator,
    };

    let public_routes = Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/token", post(token))
        .route("/api/auth/verify-email", get(confirm_email))
        .route("/api/auth/password-reset", post(request_password_reset))
        .route(
            "/api/auth/password-reset/confirm",
            post(confirm_password_reset),
        );

    let protected_routes = Router::new()
        .route("/api/users/me", get(get_me))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Only the path is recorded; headers and query strings carry tokens
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri().path(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                path = %request.uri().path(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
