// Authentication module
// Password login, bearer token issuance and identity resolution over the user store

pub mod credentials;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use credentials::CredentialService;
pub use error::{AuthError, AuthResult};
pub use handlers::{health_handler, me_handler, register_handler, token_handler};
pub use middleware::AuthenticatedUser;
pub use models::{RegisterRequest, Token, TokenRequest, User, UserResponse};
pub use password::{PasswordService, PASSWORD_HASH_COST};
pub use repository::{UserKey, UserLookup, UserRepository};
pub use service::{AuthService, Authenticator};
pub use token::{Claims, TokenService};
