#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use auth::Authenticator;
use auth::ManualClock;
use auth::PasswordHasher;
use auth::TokenCodec;
use auth::TokenLifetimes;
use chrono::Utc;
use identity_service::domain::user::authenticator::RequestAuthenticator;
use identity_service::domain::user::models::ActionLinks;
use identity_service::domain::user::models::EmailAddress;
use identity_service::domain::user::models::EmailTemplate;
use identity_service::domain::user::ports::EmailSender;
use identity_service::domain::user::service::AuthService;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::repositories::InMemoryUserRepository;
use identity_service::user::errors::EmailDispatchError;
use serde_json::json;
use tokio::sync::mpsc;
use tokio::sync::Mutex;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const FRONTEND_URL: &str = "http://frontend.test";

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub template: EmailTemplate,
    pub link: String,
}

impl SentEmail {
    /// Token carried by the link
    pub fn token(&self) -> String {
        self.link
            .split("token=")
            .nth(1)
            .expect("Link has no token")
            .to_string()
    }
}

/// Email sender that hands every message to the test instead of delivering it
pub struct CapturingEmailSender {
    sent: mpsc::UnboundedSender<SentEmail>,
}

#[async_trait]
impl EmailSender for CapturingEmailSender {
    async fn send(
        &self,
        to: &EmailAddress,
        template: EmailTemplate,
        link: &str,
    ) -> Result<(), EmailDispatchError> {
        let _ = self.sent.send(SentEmail {
            to: to.as_str().to_string(),
            template,
            link: link.to_string(),
        });
        Ok(())
    }
}

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
    pub repository: Arc<InMemoryUserRepository>,
    pub authenticator: Arc<Authenticator>,
    pub clock: ManualClock,
    mailbox: Mutex<mpsc::UnboundedReceiver<SentEmail>>,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let clock = ManualClock::new(Utc::now());
        let authenticator = Arc::new(
            Authenticator::from_parts(
                PasswordHasher::with_params(1024, 1, 1).expect("Invalid test hash parameters"),
                TokenCodec::new(TEST_SECRET, TokenLifetimes::default()),
            )
            .with_clock(Arc::new(clock.clone())),
        );

        let repository = Arc::new(InMemoryUserRepository::new());
        let (sent, mailbox) = mpsc::unbounded_channel();

        let auth_service = AuthService::new(
            Arc::clone(&repository),
            Arc::new(CapturingEmailSender { sent }),
            Arc::clone(&authenticator),
            ActionLinks::new(FRONTEND_URL),
        );
        let request_authenticator =
            RequestAuthenticator::new(Arc::clone(&repository), Arc::clone(&authenticator));

        let router = create_router(Arc::new(auth_service), Arc::new(request_authenticator));

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            api_client: reqwest::Client::new(),
            repository,
            authenticator,
            clock,
            mailbox: Mutex::new(mailbox),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> reqwest::Response {
        self.post("/api/auth/register")
            .json(&json!({
                "username": username,
                "email": email,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn login(&self, identifier: &str, password: &str) -> reqwest::Response {
        self.post("/api/auth/login")
            .json(&json!({
                "identifier": identifier,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn confirm_email(&self, token: &str) -> reqwest::Response {
        self.get("/api/auth/verify-email")
            .query(&[("token", token)])
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn me(&self, token: &str) -> reqwest::Response {
        self.get_authenticated("/api/users/me", token)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Wait for the next dispatched email
    pub async fn next_email(&self) -> SentEmail {
        let mut mailbox = self.mailbox.lock().await;
        tokio::time::timeout(Duration::from_secs(5), mailbox.recv())
            .await
            .expect("Timed out waiting for email")
            .expect("Mailbox closed")
    }

    /// Assert nothing was dispatched, allowing in-flight sends to land first
    pub async fn assert_no_email(&self) {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let mut mailbox = self.mailbox.lock().await;
        assert!(mailbox.try_recv().is_err(), "Unexpected email dispatched");
    }

    /// Register, follow the verification link and log in. Returns the access token.
    pub async fn register_verified(&self, username: &str, email: &str, password: &str) -> String {
        let response = self.register(username, email, password).await;
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let verification = self.next_email().await;
        let response = self.confirm_email(&verification.token()).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let response = self.login(username, password).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        body["data"]["access_token"]
            .as_str()
            .expect("Missing access token")
            .to_string()
    }
}
