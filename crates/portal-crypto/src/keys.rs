use constant_time_eq::constant_time_eq_32;
use sha2::{Digest, Sha256, Sha512};

use super::{CryptoError, Result};

/// Session signing key material.
pub struct SessionKey;

impl SessionKey {
    /// Derive 64 bytes of key material from a configured secret.
    pub fn derive(secret: &str) -> Result<[u8; 64]> {
        if secret.is_empty() {
            return Err(CryptoError::EmptySecretKey);
        }

        let mut key = [0u8; 64];
        key.copy_from_slice(&Sha512::digest(secret.as_bytes()));
        Ok(key)
    }
}

/// Compare two secrets in constant time.
///
/// Both sides are hashed first so their lengths do not leak either.
pub fn secure_compare(left: &str, right: &str) -> bool {
    let left: [u8; 32] = Sha256::digest(left.as_bytes()).into();
    let right: [u8; 32] = Sha256::digest(right.as_bytes()).into();

    constant_time_eq_32(&left, &right)
}
