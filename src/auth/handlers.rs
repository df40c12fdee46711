// HTTP handlers for authentication endpoints

use axum::{extract::State, Form, Json};
use crate::auth::{
    error::AuthError,
    middleware::AuthenticatedUser,
    models::{RegisterRequest, Token, TokenRequest, UserResponse},
    service::AuthService,
};
use std::sync::Arc;
use validator::Validate;

/// Exchange a username and password for a bearer token
/// POST /v1/auth/token
#[utoipa::path(
    post,
    path = "/v1/auth/token",
    request_body(content = TokenRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Token issued", body = Token),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    ),
    tag = "auth"
)]
pub async fn token_handler(
    State(service): State<Arc<AuthService>>,
    Form(request): Form<TokenRequest>,
) -> Result<Json<Token>, AuthError> {
    let token = service
        .authenticate_and_issue(&request.username, &request.password)
        .await?;
    Ok(Json(token))
}

/// Register a new user
/// POST /v1/auth/register
#[utoipa::path(
    post,
    path = "/v1/auth/register",
    request_body(content = RegisterRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid input data"),
        (status = 409, description = "Unable to create user"),
        (status = 500, description = "Internal server error")
    ),
    tag = "auth"
)]
pub async fn register_handler(
    State(service): State<Arc<AuthService>>,
    Form(request): Form<RegisterRequest>,
) -> Result<Json<UserResponse>, AuthError> {
    request.validate()?;

    let user = service
        .register_user(&request.username, Some(&request.email), &request.password)
        .await?;
    Ok(Json(user.into()))
}

/// Get the current user's record
/// GET /v1/auth/users/me
#[utoipa::path(
    get,
    path = "/v1/auth/users/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "auth"
)]
pub async fn me_handler(AuthenticatedUser(user): AuthenticatedUser) -> Json<UserResponse> {
    Json(user.into())
}

/// Liveness check
/// GET /health/plain
#[utoipa::path(
    get,
    path = "/health/plain",
    responses((status = 200, description = "Service is up", body = bool)),
    tag = "health"
)]
pub async fn health_handler() -> Json<bool> {
    Json(true)
}
