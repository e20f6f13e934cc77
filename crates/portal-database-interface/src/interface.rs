use async_trait::async_trait;
use portal_models::User;

use crate::{DatabaseError, Result};

#[async_trait]
pub trait DbService: Send + Sync {
    /// Create a user. The given ID is ignored and a new one is assigned.
    async fn users_create(&self, instance: User) -> Result<User>;
    async fn users_update(&self, instance: User) -> Result<User>;
    async fn users_all(&self) -> Result<Vec<User>>;
    /// Exact primary-key match.
    async fn users_get(&self, id: u64) -> Result<Option<User>>;
    async fn users_get_expect(&self, id: u64) -> Result<User> {
        self.users_get(id)
            .await?
            .ok_or(DatabaseError::UnknownUserId(id))
    }
    async fn users_get_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn users_get_by_username_expect(&self, username: &str) -> Result<User> {
        self.users_get_by_username(username)
            .await?
            .ok_or_else(|| DatabaseError::UnknownUser(username.into()))
    }
    async fn users_get_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn users_delete(&self, id: u64) -> Result<bool>;
    async fn users_set_active(&self, id: u64, value: bool) -> Result<User>;
    async fn health_check(&self) -> Result<()>;
}
