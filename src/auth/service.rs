// Authentication service - business logic layer

use crate::auth::{
    credentials::CredentialService,
    error::{AuthError, AuthResult},
    models::{Token, User},
    repository::{UserKey, UserLookup},
    token::{Claims, TokenService},
};
use async_trait::async_trait;

/// The authentication capabilities the route layer depends on
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, username: &str, password: &str) -> AuthResult<Option<User>>;

    fn mint(&self, user: &User) -> AuthResult<Token>;

    fn validate(&self, token: &str) -> AuthResult<Claims>;
}

/// Authentication service coordinating credential checks and tokens
#[derive(Clone)]
pub struct AuthService {
    credentials: CredentialService,
    tokens: TokenService,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(credentials: CredentialService, tokens: TokenService) -> Self {
        Self {
            credentials,
            tokens,
        }
    }

    /// Check a username/password pair and issue a bearer token
    ///
    /// Unknown users, wrong passwords and disabled accounts all produce
    /// `AuthError::InvalidCredentials`.
    pub async fn authenticate_and_issue(&self, username: &str, password: &str) -> AuthResult<Token> {
        let user = self
            .authenticate(username, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if user.disabled {
            tracing::debug!("Login refused for disabled account");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.mint(&user)?;
        tracing::info!(guid = ?user.guid, "Issued access token");
        Ok(token)
    }

    /// Resolve a bearer token to the user's current record
    ///
    /// Flags come from the store, not from the token's claims.
    pub async fn resolve_identity(&self, token: &str) -> AuthResult<User> {
        let claims = self.validate(token)?;

        match self.credentials.users().find_user(&UserKey::Guid(claims.sub)).await {
            UserLookup::Found(user) => Ok(user),
            UserLookup::NotFound => {
                tracing::debug!("Token subject no longer exists");
                Err(AuthError::InvalidCredentials)
            }
            UserLookup::Unavailable(e) => Err(e.into()),
        }
    }

    /// Create a new account
    pub async fn register_user(&self, username: &str, email: Option<&str>, password: &str) -> AuthResult<User> {
        self.credentials.register(username, email, password).await
    }
}

#[async_trait]
impl Authenticator for AuthService {
    async fn authenticate(&self, username: &str, password: &str) -> AuthResult<Option<User>> {
        self.credentials.authenticate(username, password).await
    }

    fn mint(&self, user: &User) -> AuthResult<Token> {
        self.tokens.mint(user)
    }

    fn validate(&self, token: &str) -> AuthResult<Claims> {
        self.tokens.validate(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::PasswordService;
    use crate::auth::repository::UserRepository;
    use crate::config::TokenConfig;
    use crate::test_support::InMemoryProcedures;
    use jsonwebtoken::Algorithm;
    use std::sync::Arc;

    struct Fixture {
        store: Arc<InMemoryProcedures>,
        service: AuthService,
        bob: String,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryProcedures::new());
        let passwords = PasswordService::with_cost(4).unwrap();
        let bob = store.seed("bob", &passwords.hash_password("correct horse").unwrap(), false, true);
        store.seed("eve", &passwords.hash_password("disabled pw").unwrap(), true, false);

        let tokens = TokenService::new(&TokenConfig {
            secret: "test_secret_key_for_testing_purposes".to_string(),
            algorithm: Algorithm::HS256,
            issuer: "credential-service".to_string(),
            lifetime: chrono::Duration::minutes(15),
        });
        let credentials = CredentialService::new(UserRepository::new(store.clone()), passwords);

        Fixture {
            store,
            service: AuthService::new(credentials, tokens),
            bob,
        }
    }

    #[tokio::test]
    async fn test_issue_then_resolve() {
        let f = fixture();

        let token = f.service.authenticate_and_issue("bob", "correct horse").await.unwrap();
        let claims = f.service.validate(&token.access_token).unwrap();
        assert_eq!(claims.sub, f.bob);
        assert!(claims.admin);

        let user = f.service.resolve_identity(&token.access_token).await.unwrap();
        assert_eq!(user.username, "bob");
        assert_eq!(user.guid.as_deref(), Some(f.bob.as_str()));
    }

    #[tokio::test]
    async fn test_bad_credentials_are_uniform() {
        let f = fixture();

        let wrong_password = f.service.authenticate_and_issue("bob", "nope").await;
        let unknown_user = f.service.authenticate_and_issue("nobody", "nope").await;

        assert!(matches!(wrong_password, Err(AuthError::InvalidCredentials)));
        assert!(matches!(unknown_user, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_disabled_account_cannot_log_in() {
        let f = fixture();

        let result = f.service.authenticate_and_issue("eve", "disabled pw").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_resolve_uses_current_store_state() {
        let f = fixture();
        let token = f.service.authenticate_and_issue("bob", "correct horse").await.unwrap();

        f.store.set_disabled(&f.bob, true);

        // The token still carries the snapshot taken at mint time
        let claims = f.service.validate(&token.access_token).unwrap();
        assert!(!claims.disabled);

        let user = f.service.resolve_identity(&token.access_token).await.unwrap();
        assert!(user.disabled);
    }

    #[tokio::test]
    async fn test_resolve_deleted_user_is_invalid_credentials() {
        let f = fixture();
        let token = f.service.authenticate_and_issue("bob", "correct horse").await.unwrap();

        f.store.remove(&f.bob);

        let result = f.service.resolve_identity(&token.access_token).await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_resolve_during_outage_is_store_unavailable() {
        let f = fixture();
        let token = f.service.authenticate_and_issue("bob", "correct horse").await.unwrap();

        f.store.set_offline(true);

        let result = f.service.resolve_identity(&token.access_token).await;
        assert!(matches!(result, Err(AuthError::StoreUnavailable)));
    }

    #[tokio::test]
    async fn test_resolve_garbage_token() {
        let f = fixture();

        let result = f.service.resolve_identity("not.a.token").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_register_user_then_login() {
        let f = fixture();

        let user = f
            .service
            .register_user("carol", Some("c@x.com"), "carol's password")
            .await
            .unwrap();
        let token = f
            .service
            .authenticate_and_issue("carol", "carol's password")
            .await
            .unwrap();

        assert_eq!(f.service.validate(&token.access_token).unwrap().sub, user.guid.unwrap());
    }

    #[tokio::test]
    async fn test_login_during_outage_is_store_unavailable() {
        let f = fixture();
        f.store.set_offline(true);

        let result = f.service.authenticate_and_issue("bob", "correct horse").await;
        assert!(matches!(result, Err(AuthError::StoreUnavailable)));
    }
}
