// JWT access token minting and validation

use crate::auth::error::AuthError;
use crate::auth::models::{Token, User};
use crate::config::TokenConfig;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT claims structure
///
/// `disabled` and `admin` are copied from the user when the token is minted
/// and are not refreshed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user guid
    pub disabled: bool,
    pub admin: bool,
    pub iss: String,
    pub exp: i64, // expiration timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>, // issued at timestamp, always written on mint
}

/// Token service for JWT operations
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    issuer: String,
    lifetime: chrono::Duration,
}

impl TokenService {
    /// Create a new TokenService from the signing configuration
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            algorithm: config.algorithm,
            issuer: config.issuer.clone(),
            lifetime: config.lifetime,
        }
    }

    /// Mint an access token for a user
    pub fn mint(&self, user: &User) -> Result<Token, AuthError> {
        self.mint_at(user, Utc::now().timestamp())
    }

    /// Mint an access token as if the current time were `now` (unix seconds)
    pub fn mint_at(&self, user: &User, now: i64) -> Result<Token, AuthError> {
        let guid = user
            .guid
            .clone()
            .ok_or_else(|| AuthError::Internal("cannot mint a token for a user without a guid".to_string()))?;

        let claims = Claims {
            sub: guid,
            disabled: user.disabled,
            admin: user.admin,
            iss: self.issuer.clone(),
            iat: Some(now),
            exp: now + self.lifetime_secs(),
        };

        let access_token = encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("token generation failed: {}", e)))?;

        Ok(Token::bearer(access_token))
    }

    /// Lifetime in whole seconds, rounded up so a token is never minted already expired
    fn lifetime_secs(&self) -> i64 {
        (self.lifetime.num_milliseconds() + 999).div_euclid(1000).max(1)
    }

    /// Validate a token and return its claims
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate_at(token, Utc::now().timestamp())
    }

    /// Validate a token as if the current time were `now` (unix seconds)
    ///
    /// Any failure is reported as `InvalidCredentials`; the reason is only logged.
    pub fn validate_at(&self, token: &str, now: i64) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        // Expiry is checked below so that a token is already expired at `exp`
        validation.validate_exp = false;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Token rejected: {}", e);
                AuthError::InvalidCredentials
            })?;

        if now >= claims.exp {
            tracing::debug!("Token rejected: expired at {}", claims.exp);
            return Err(AuthError::InvalidCredentials);
        }
        if claims.sub.is_empty() {
            tracing::debug!("Token rejected: empty subject");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(claims)
    }
}
