use portal_crypto::{CryptoError, PasswordHasher};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub active: bool,
}

impl User {
    /// Store the hash of `password`.
    pub fn with_password(
        mut self,
        hasher: &PasswordHasher,
        password: &str,
    ) -> Result<Self, CryptoError> {
        self.password_hash = hasher.hash(password)?;
        Ok(self)
    }

    /// Check `password` against the stored hash.
    ///
    /// Users without a stored hash never match.
    pub fn check_password(
        &self,
        hasher: &PasswordHasher,
        password: &str,
    ) -> Result<bool, CryptoError> {
        if self.password_hash.is_empty() {
            return Ok(false);
        }

        hasher.verify(password, &self.password_hash)
    }
}
