//! Crypto errors.

use thiserror::Error;

/// Crypto error.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Invalid bcrypt cost {cost}, expected a value between {min} and {max}")]
    InvalidCost { cost: u32, min: u32, max: u32 },
    #[error("Password hashing error: {source}")]
    HashFailed { source: bcrypt::BcryptError },
    #[error("Invalid password hash: {source}")]
    InvalidHash { source: bcrypt::BcryptError },
    #[error("Secret key is empty")]
    EmptySecretKey,
}

/// Result alias for `CryptoError`.
pub type Result<T, E = CryptoError> = ::core::result::Result<T, E>;
