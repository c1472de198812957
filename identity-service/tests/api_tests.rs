mod common;

use auth::TokenKind;
use common::TestApp;
use identity_service::domain::user::models::EmailAddress;
use identity_service::domain::user::models::EmailTemplate;
use identity_service::domain::user::models::User;
use identity_service::domain::user::models::Username;
use identity_service::domain::user::ports::UserRepository;
use reqwest::header::WWW_AUTHENTICATE;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_register_success() {
    let app = TestApp::spawn().await;

    let response = app.register("alice", "a@x.com", "pw1").await;

    assert_eq!(response.status(), StatusCode::CREATED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status_code"], 201);
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["email"], "a@x.com");
    assert_eq!(body["data"]["is_verified"], false);
    assert!(body["data"]["id"].is_string());
    assert!(body["data"].get("password_hash").is_none());

    let email = app.next_email().await;
    assert_eq!(email.to, "a@x.com");
    assert_eq!(email.template, EmailTemplate::Verify);
    assert!(email
        .link
        .starts_with("http://frontend.test/verify-email?token="));
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let app = TestApp::spawn().await;

    app.register("alice", "a@x.com", "pw1").await;
    let response = app.register("alice", "b@y.com", "pw2").await;

    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(
        body["data"]["message"],
        "Username or email already registered"
    );
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = TestApp::spawn().await;

    app.register("alice", "a@x.com", "pw1").await;
    let response = app.register("bob", "a@x.com", "pw2").await;

    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Same message as a username collision
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(
        body["data"]["message"],
        "Username or email already registered"
    );
}

#[tokio::test]
async fn test_register_invalid_username() {
    let app = TestApp::spawn().await;

    let response = app.register("a!", "a@x.com", "pw1").await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    app.assert_no_email().await;
}

#[tokio::test]
async fn test_login_before_verification() {
    let app = TestApp::spawn().await;

    app.register("alice", "a@x.com", "pw1").await;
    let response = app.login("alice", "pw1").await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(
        body["data"]["message"],
        "Email not verified. Please check your inbox."
    );
}

#[tokio::test]
async fn test_verify_then_login_then_me() {
    let app = TestApp::spawn().await;

    app.register("alice", "a@x.com", "pw1").await;
    let verification = app.next_email().await;

    let response = app.confirm_email(&verification.token()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.login("alice", "pw1").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["token_type"], "bearer");
    assert_eq!(body["data"]["user"]["is_verified"], true);
    assert!(body["data"]["expires_at"].is_string());
    let token = body["data"]["access_token"].as_str().unwrap().to_string();

    let response = app.me(&token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["email"], "a@x.com");
}

#[tokio::test]
async fn test_login_with_email_identifier() {
    let app = TestApp::spawn().await;
    app.register_verified("alice", "a@x.com", "pw1").await;

    let response = app.login("a@x.com", "pw1").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["user"]["username"], "alice");
}

#[tokio::test]
async fn test_token_endpoint_accepts_password_form() {
    let app = TestApp::spawn().await;
    app.register_verified("alice", "a@x.com", "pw1").await;

    let response = app
        .post("/api/auth/token")
        .form(&[("username", "alice"), ("password", "pw1")])
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["token_type"], "bearer");
    assert!(body["data"]["access_token"].is_string());
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::spawn().await;
    app.register_verified("alice", "a@x.com", "pw1").await;

    let unknown = app.login("nonexistent", "anything").await;
    let wrong_password = app.login("alice", "wrongpw").await;

    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.headers().get(WWW_AUTHENTICATE).unwrap(), "Bearer");

    let unknown_body: serde_json::Value = unknown.json().await.unwrap();
    let wrong_password_body: serde_json::Value = wrong_password.json().await.unwrap();
    assert_eq!(unknown_body, wrong_password_body);
}

#[tokio::test]
async fn test_login_deactivated_account() {
    let app = TestApp::spawn().await;
    app.register_verified("alice", "a@x.com", "pw1").await;

    let username = Username::new("alice".to_string()).unwrap();
    let mut alice = app
        .repository
        .find_by_username(&username)
        .await
        .unwrap()
        .unwrap();
    alice.is_active = false;
    app.repository.put(alice).await;

    let response = app.login("alice", "pw1").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_confirm_email_twice_is_idempotent() {
    let app = TestApp::spawn().await;

    app.register("alice", "a@x.com", "pw1").await;
    let token = app.next_email().await.token();

    assert_eq!(app.confirm_email(&token).await.status(), StatusCode::OK);
    assert_eq!(app.confirm_email(&token).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_confirm_email_rejects_expired_token() {
    let app = TestApp::spawn().await;

    app.register("alice", "a@x.com", "pw1").await;
    let token = app.next_email().await.token();

    app.clock.advance(chrono::Duration::minutes(31));

    let response = app.confirm_email(&token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Still unverified
    let response = app.login("alice", "pw1").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_confirm_email_rejects_access_token() {
    let app = TestApp::spawn().await;
    let access_token = app.register_verified("alice", "a@x.com", "pw1").await;

    let response = app.confirm_email(&access_token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_me_requires_bearer_token() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/api/users/me")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers().get(WWW_AUTHENTICATE).unwrap(), "Bearer");
}

#[tokio::test]
async fn test_me_rejects_untrusted_tokens_uniformly() {
    let app = TestApp::spawn().await;
    app.register("alice", "a@x.com", "pw1").await;
    let verify_token = app.next_email().await.token();

    let garbage = app.me("not-a-token").await;
    let wrong_kind = app.me(&verify_token).await;

    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_kind.status(), StatusCode::UNAUTHORIZED);

    let garbage_body: serde_json::Value = garbage.json().await.unwrap();
    let wrong_kind_body: serde_json::Value = wrong_kind.json().await.unwrap();
    assert_eq!(garbage_body, wrong_kind_body);
}

#[tokio::test]
async fn test_me_unverified_account_is_forbidden() {
    let app = TestApp::spawn().await;
    app.register("alice", "a@x.com", "pw1").await;

    // Login refuses unverified accounts, so mint the token directly
    let token = app
        .authenticator
        .issue_token(TokenKind::Access, "alice")
        .unwrap()
        .token;

    let response = app.me(&token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_me_deactivated_account_looks_like_bad_token() {
    let app = TestApp::spawn().await;
    let token = app.register_verified("alice", "a@x.com", "pw1").await;

    let username = Username::new("alice".to_string()).unwrap();
    let mut alice = app
        .repository
        .find_by_username(&username)
        .await
        .unwrap()
        .unwrap();
    alice.is_active = false;
    app.repository.put(alice).await;

    let deactivated = app.me(&token).await;
    let garbage = app.me("not-a-token").await;

    assert_eq!(deactivated.status(), StatusCode::UNAUTHORIZED);
    let deactivated_body: serde_json::Value = deactivated.json().await.unwrap();
    let garbage_body: serde_json::Value = garbage.json().await.unwrap();
    assert_eq!(deactivated_body, garbage_body);
}

#[tokio::test]
async fn test_access_token_expires() {
    let app = TestApp::spawn().await;
    let token = app.register_verified("alice", "a@x.com", "pw1").await;

    app.clock.advance(chrono::Duration::minutes(59));
    assert_eq!(app.me(&token).await.status(), StatusCode::OK);

    app.clock.advance(chrono::Duration::minutes(1));
    assert_eq!(app.me(&token).await.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_password_reset_for_unknown_email() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/auth/password-reset")
        .json(&json!({ "email": "ghost@x.com" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    app.assert_no_email().await;
}

#[tokio::test]
async fn test_password_reset_flow() {
    let app = TestApp::spawn().await;
    app.register_verified("alice", "a@x.com", "old_pw").await;

    let response = app
        .post("/api/auth/password-reset")
        .json(&json!({ "email": "a@x.com" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let reset = app.next_email().await;
    assert_eq!(reset.template, EmailTemplate::Reset);
    assert!(reset
        .link
        .starts_with("http://frontend.test/reset-password?token="));
    app.assert_no_email().await;

    let response = app
        .post("/api/auth/password-reset/confirm")
        .json(&json!({ "token": reset.token(), "new_password": "new_pw" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(
        app.login("alice", "old_pw").await.status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(app.login("alice", "new_pw").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_password_reset_confirm_rejects_verification_token() {
    let app = TestApp::spawn().await;

    app.register("alice", "a@x.com", "pw1").await;
    let verify_token = app.next_email().await.token();

    let response = app
        .post("/api/auth/password-reset/confirm")
        .json(&json!({ "token": verify_token, "new_password": "new_pw" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_password_reset_does_not_verify_account() {
    let app = TestApp::spawn().await;

    app.register("alice", "a@x.com", "pw1").await;
    let _verification = app.next_email().await;

    app.post("/api/auth/password-reset")
        .json(&json!({ "email": "a@x.com" }))
        .send()
        .await
        .expect("Failed to execute request");
    let reset = app.next_email().await;

    let response = app
        .post("/api/auth/password-reset/confirm")
        .json(&json!({ "token": reset.token(), "new_password": "new_pw" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(
        app.login("alice", "new_pw").await.status(),
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn test_account_predating_username_rules() {
    let app = TestApp::spawn().await;

    let mut legacy = User::register(
        Username::new("placeholder".to_string()).unwrap(),
        EmailAddress::new("john@x.com".to_string()).unwrap(),
        app.authenticator.hash_password("pw1").unwrap(),
    );
    legacy.username = Username::from_stored("john.doe".to_string());
    legacy.is_verified = true;
    app.repository.put(legacy).await;

    let response = app
        .post("/api/auth/password-reset")
        .json(&json!({ "email": "john@x.com" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(app.next_email().await.template, EmailTemplate::Reset);

    let response = app.login("john.doe", "pw1").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    let token = body["data"]["access_token"].as_str().unwrap().to_string();

    let response = app.me(&token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["username"], "john.doe");

    // Registration still applies the rules to new input
    let response = app.register("jane.doe", "jane@x.com", "pw1").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
