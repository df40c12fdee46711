use credential_service::{
    auth::{AuthService, CredentialService, PasswordService, TokenService, UserRepository},
    config::AppConfig,
    db::{MySqlConnector, MySqlProcedures, PoolManager},
    routes::create_router,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Credential service - Starting...");

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    tracing::debug!(?config, "Loaded configuration");

    // Blocks until the database accepts connections
    tracing::info!("Connecting to database...");
    let pool = PoolManager::new(MySqlConnector::new(&config.database), config.database.retry_interval)
        .acquire_pool()
        .await;

    let passwords = PasswordService::new().expect("Failed to initialise password hashing");
    let users = UserRepository::new(Arc::new(MySqlProcedures::new(pool)));
    let service = Arc::new(AuthService::new(
        CredentialService::new(users, passwords),
        TokenService::new(&config.token),
    ));

    let app = create_router(service);

    let addr = config.server.bind_address();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Credential service is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
