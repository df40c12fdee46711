// Credential checks and registration on top of the user repository

use crate::auth::error::{AuthError, AuthResult};
use crate::auth::models::User;
use crate::auth::password::PasswordService;
use crate::auth::repository::{UserKey, UserLookup, UserRepository};
use crate::db::DaoError;

/// Verifies username/password pairs and creates new accounts
#[derive(Clone)]
pub struct CredentialService {
    users: UserRepository,
    passwords: PasswordService,
}

impl CredentialService {
    pub fn new(users: UserRepository, passwords: PasswordService) -> Self {
        Self { users, passwords }
    }

    pub fn users(&self) -> &UserRepository {
        &self.users
    }

    /// Return the user only when the account exists and the password matches
    ///
    /// Unknown username and wrong password both yield `Ok(None)`.
    pub async fn authenticate(&self, username: &str, password: &str) -> AuthResult<Option<User>> {
        let lookup = self.users.find_user(&UserKey::Username(username.to_string())).await;

        let user = match lookup {
            UserLookup::Found(user) => user,
            UserLookup::NotFound => {
                tracing::debug!("User not found during authentication");
                self.run_blocking(password, None).await?;
                return Ok(None);
            }
            UserLookup::Unavailable(e) => return Err(e.into()),
        };

        let matches = self
            .run_blocking(password, Some(user.hashed_password.clone()))
            .await?;

        Ok(matches.then_some(user))
    }

    /// Hash the password and create the account
    ///
    /// # Errors
    /// * `AuthError::RegistrationConflict` - the username is already taken
    pub async fn register(&self, username: &str, email: Option<&str>, password: &str) -> AuthResult<User> {
        let passwords = self.passwords.clone();
        let plain = password.to_string();
        let hashed_password = tokio::task::spawn_blocking(move || passwords.hash_password(&plain))
            .await
            .map_err(|e| AuthError::Internal(format!("password hashing task failed: {}", e)))??;

        let user = User::new_unregistered(username.to_string(), email.map(str::to_string), hashed_password);

        self.users.create_user(user).await.map_err(|e| match e {
            DaoError::IncorrectRowCount { .. } | DaoError::DuplicateKey => {
                tracing::debug!("Registration conflict");
                AuthError::RegistrationConflict
            }
            other => other.into(),
        })
    }

    /// Verify on the blocking pool; with no stored hash, burn a dummy verification
    async fn run_blocking(&self, password: &str, hash: Option<String>) -> AuthResult<bool> {
        let passwords = self.passwords.clone();
        let plain = password.to_string();

        tokio::task::spawn_blocking(move || match hash {
            Some(hash) => passwords.verify_password(&plain, &hash),
            None => {
                passwords.verify_dummy(&plain);
                false
            }
        })
        .await
        .map_err(|e| AuthError::Internal(format!("password verification task failed: {}", e)))
    }
}
