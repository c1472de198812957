use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use auth::PasswordHasher;
use auth::TokenCodec;
use identity_service::config::Config;
use identity_service::config::EmailProvider;
use identity_service::domain::user::authenticator::RequestAuthenticator;
use identity_service::domain::user::models::ActionLinks;
use identity_service::domain::user::ports::AuthServicePort;
use identity_service::domain::user::ports::EmailSender;
use identity_service::domain::user::ports::RequestAuthenticatorPort;
use identity_service::domain::user::ports::UserRepository;
use identity_service::domain::user::service::AuthService;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::email::EmailComposer;
use identity_service::outbound::email::LogEmailSender;
use identity_service::outbound::email::MailjetEmailSender;
use identity_service::outbound::repositories::InMemoryUserRepository;
use identity_service::outbound::repositories::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "identity_service=debug,auth=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "identity-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;
    config.validate()?;

    tracing::info!(
        http_port = config.server.http_port,
        database_configured = config.database.url.is_some(),
        email_provider = ?config.email.provider,
        links_base_url = %config.links.base_url,
        access_token_minutes = config.jwt.access_token_minutes,
        leeway_seconds = config.jwt.leeway_seconds,
        "Configuration loaded"
    );

    let lifetimes = config.jwt.lifetimes();
    let password_hasher = PasswordHasher::with_params(
        config.password.memory_kib,
        config.password.iterations,
        config.password.parallelism,
    )?;
    let token_codec = TokenCodec::new(config.jwt.secret.as_bytes(), lifetimes)
        .with_leeway(config.jwt.leeway_seconds);
    let authenticator = Arc::new(Authenticator::from_parts(password_hasher, token_codec));

    let email_sender: Arc<dyn EmailSender> = match config.email.provider {
        EmailProvider::Mailjet => {
            let composer = EmailComposer::new(config.email.sender_name.clone(), &lifetimes);
            let sender = MailjetEmailSender::new(
                config.email.api_key.clone().unwrap_or_default(),
                config.email.api_secret.clone().unwrap_or_default(),
                config.email.sender.clone(),
                config.email.sender_name.clone(),
                Duration::from_secs(config.email.timeout_seconds),
                composer,
            )?;
            tracing::info!(provider = "mailjet", "Email sender configured");
            Arc::new(sender)
        }
        EmailProvider::Log => {
            tracing::warn!(provider = "log", "Email delivery disabled; emails are only logged");
            Arc::new(LogEmailSender::new())
        }
    };

    let links = ActionLinks::new(config.links.base_url.clone());

    let (auth_service, request_authenticator) = match &config.database.url {
        Some(url) => {
            let pg_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(url)
                .await?;
            tracing::info!(
                max_connections = config.database.max_connections,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            wire(
                Arc::new(PostgresUserRepository::new(pg_pool)),
                email_sender,
                authenticator,
                links,
            )
        }
        None => {
            tracing::warn!("No database configured; users are kept in memory and lost on exit");
            wire(
                Arc::new(InMemoryUserRepository::new()),
                email_sender,
                authenticator,
                links,
            )
        }
    };

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(auth_service, request_authenticator);

    if let Err(e) = axum::serve(http_listener, http_application).await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    tracing::info!("Server exited successfully");

    Ok(())
}

fn wire<UR>(
    repository: Arc<UR>,
    email_sender: Arc<dyn EmailSender>,
    authenticator: Arc<Authenticator>,
    links: ActionLinks,
) -> (Arc<dyn AuthServicePort>, Arc<dyn RequestAuthenticatorPort>)
where
    UR: UserRepository,
{
    let auth_service = AuthService::new(
        Arc::clone(&repository),
        email_sender,
        Arc::clone(&authenticator),
        links,
    );
    let request_authenticator = RequestAuthenticator::new(repository, authenticator);

    (Arc::new(auth_service), Arc::new(request_authenticator))
}
