use super::{CryptoError, Result};

/// Lowest cost accepted by bcrypt.
pub const MIN_COST: u32 = 4;
/// Highest cost accepted by bcrypt.
pub const MAX_COST: u32 = 31;

/// Bcrypt password hasher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// Create a hasher using `cost` log rounds.
    pub fn new(cost: u32) -> Result<Self> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(CryptoError::InvalidCost {
                cost,
                min: MIN_COST,
                max: MAX_COST,
            });
        }

        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password.
    pub fn hash(&self, password: &str) -> Result<String> {
        bcrypt::hash(password, self.cost).map_err(|e| CryptoError::HashFailed { source: e })
    }

    /// Check a password against a stored hash.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        bcrypt::verify(password, hash).map_err(|e| CryptoError::InvalidHash { source: e })
    }

    /// Spend the work of a [`verify`](Self::verify) call when there is no
    /// stored hash to check against. Always fails.
    pub fn verify_missing(&self, password: &str) -> bool {
        let _ = bcrypt::hash(password, self.cost);
        false
    }
}
