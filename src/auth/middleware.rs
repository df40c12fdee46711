// Bearer token extraction for protected routes

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use crate::auth::{error::AuthError, models::User, service::AuthService};
use std::sync::Arc;
use tracing::warn;

/// Authenticated user extractor for protected routes
///
/// Holds the user's current record from the store, resolved from the bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let service = Arc::<AuthService>::from_ref(state);

        let user = service.resolve_identity(token).await?;
        Ok(AuthenticatedUser(user))
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header
fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| {
            warn!("Authorization header is not valid ASCII");
            AuthError::InvalidCredentials
        })?;

    // The scheme name is case-insensitive
    match auth_header.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(AuthError::InvalidCredentials),
    }
}
