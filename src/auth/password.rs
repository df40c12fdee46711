// Password hashing and verification

use crate::auth::error::AuthError;

/// bcrypt work factor for newly created hashes
///
/// Verification reads the cost embedded in each stored hash, so raising this
/// does not invalidate existing passwords.
pub const PASSWORD_HASH_COST: u32 = 12;

/// Password service for hashing and verification
#[derive(Clone)]
pub struct PasswordService {
    cost: u32,
    /// Hash verified against when an account does not exist
    dummy_hash: String,
}

impl PasswordService {
    /// Create a service using the pinned cost factor
    pub fn new() -> Result<Self, AuthError> {
        Self::with_cost(PASSWORD_HASH_COST)
    }

    pub fn with_cost(cost: u32) -> Result<Self, AuthError> {
        let dummy_hash = bcrypt::hash("no-such-account", cost)
            .map_err(|e| AuthError::Internal(format!("password hashing failed: {}", e)))?;
        Ok(Self { cost, dummy_hash })
    }

    /// Hash a password with a fresh salt
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        bcrypt::hash(password, self.cost)
            .map_err(|e| AuthError::Internal(format!("password hashing failed: {}", e)))
    }

    /// Verify a password against a stored hash
    ///
    /// An unparseable stored hash never matches.
    pub fn verify_password(&self, password: &str, hash: &str) -> bool {
        match bcrypt::verify(password, hash) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!("Stored password hash could not be verified: {}", e);
                false
            }
        }
    }

    /// Spend the same work as a real verification, for absent accounts
    pub fn verify_dummy(&self, password: &str) {
        let _ = bcrypt::verify(password, &self.dummy_hash);
    }
}
