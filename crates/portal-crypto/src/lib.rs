//! Crypto module.

mod errors;
mod keys;
mod password;

pub use self::{
    errors::{CryptoError, Result},
    keys::{secure_compare, SessionKey},
    password::{PasswordHasher, MAX_COST, MIN_COST},
};
