// Router assembly and OpenAPI description

use crate::auth::{self, AuthService};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::handlers::token_handler,
        auth::handlers::register_handler,
        auth::handlers::me_handler,
        auth::handlers::health_handler,
    ),
    components(
        schemas(auth::Token, auth::TokenRequest, auth::RegisterRequest, auth::UserResponse)
    ),
    tags(
        (name = "auth", description = "Token issuance and user registration"),
        (name = "health", description = "Service health")
    ),
    info(
        title = "Credential Service API",
        version = "0.1.0",
        description = "Issues and resolves bearer tokens for username/password accounts"
    )
)]
pub struct ApiDoc;

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS and tracing middleware
pub fn create_router(service: Arc<AuthService>) -> Router {
    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health/plain", get(auth::health_handler))
        .route("/v1/auth/token", post(auth::token_handler))
        .route("/v1/auth/register", post(auth::register_handler))
        .route("/v1/auth/users/me", get(auth::me_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}
