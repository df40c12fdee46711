// Authentication data models and DTOs

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// bcrypt only reads this many bytes of a password
pub const PASSWORD_MAX_BYTES: usize = 72;

/// Token type reported alongside every access token
pub const TOKEN_TYPE_BEARER: &str = "bearer";

/// User identity record as held by the store
///
/// Not serializable: only [`UserResponse`] leaves the service.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    /// Store-assigned identifier; `None` until the user has been created
    pub guid: Option<String>,
    pub username: String,
    pub email: Option<String>,
    pub hashed_password: String,
    pub disabled: bool,
    pub admin: bool,
}

impl User {
    /// A user that has not been persisted yet
    pub fn new_unregistered(username: String, email: Option<String>, hashed_password: String) -> Self {
        Self {
            guid: None,
            username,
            email,
            hashed_password,
            disabled: false,
            admin: false,
        }
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("guid", &self.guid)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("hashed_password", &"<redacted>")
            .field("disabled", &self.disabled)
            .field("admin", &self.admin)
            .finish()
    }
}

/// User response model (excludes hashed_password)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub guid: String,
    pub username: String,
    pub email: Option<String>,
    pub disabled: bool,
    pub admin: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            guid: user.guid.unwrap_or_default(),
            username: user.username,
            email: user.email,
            disabled: user.disabled,
            admin: user.admin,
        }
    }
}

/// Bearer access token issued on successful authentication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}

impl Token {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
        }
    }
}

/// Token request form (username/password grant)
#[derive(Deserialize, ToSchema)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

/// Registration request form
#[derive(Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8), custom = "validate_password_bytes")]
    pub password: String,
}

/// Rejects passwords that bcrypt would silently truncate
fn validate_password_bytes(password: &str) -> Result<(), ValidationError> {
    if password.len() > PASSWORD_MAX_BYTES {
        Err(ValidationError::new("password_too_long"))
    } else {
        Ok(())
    }
}
