use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        RwLock,
    },
};

use async_trait::async_trait;
use portal_database_interface::{DatabaseError, DbService, Result};
use portal_models::User;

#[derive(Debug, Default)]
pub struct MemoryDb {
    users: RwLock<HashMap<u64, User>>,
    last_user_id: AtomicU64,
}

impl MemoryDb {
    pub fn new() -> Self {
        Default::default()
    }

    /// Ids are never reused, even after a delete.
    fn next_user_id(&self) -> u64 {
        self.last_user_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn find_user<F>(&self, predicate: F) -> Option<User>
    where
        F: Fn(&User) -> bool,
    {
        self.users
            .read()
            .unwrap()
            .values()
            .find(|u| predicate(u))
            .cloned()
    }
}

#[async_trait]
impl DbService for MemoryDb {
    #[tracing::instrument(skip_all, fields(username = %instance.username))]
    async fn users_create(&self, mut instance: User) -> Result<User> {
        let mut users = self.users.write().unwrap();
        if users
            .values()
            .any(|u| u.username == instance.username || u.email == instance.email)
        {
            return Err(DatabaseError::UserAlreadyExists(instance.username));
        }

        instance.id = self.next_user_id();
        users.insert(instance.id, instance.clone());
        Ok(instance)
    }

    async fn users_update(&self, instance: User) -> Result<User> {
        let mut users = self.users.write().unwrap();
        match users.get_mut(&instance.id) {
            Some(existing) => {
                *existing = instance.clone();
                Ok(instance)
            }
            None => Err(DatabaseError::UnknownUserId(instance.id)),
        }
    }

    async fn users_all(&self) -> Result<Vec<User>> {
        let mut values: Vec<_> = self.users.read().unwrap().values().cloned().collect();
        values.sort_by_key(|u| u.id);
        Ok(values)
    }

    async fn users_get(&self, id: u64) -> Result<Option<User>> {
        Ok(self.users.read().unwrap().get(&id).cloned())
    }

    async fn users_get_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self.find_user(|u| u.username == username))
    }

    async fn users_get_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.find_user(|u| u.email == email))
    }

    async fn users_delete(&self, id: u64) -> Result<bool> {
        Ok(self.users.write().unwrap().remove(&id).is_some())
    }

    async fn users_set_active(&self, id: u64, value: bool) -> Result<User> {
        let mut users = self.users.write().unwrap();
        let user = users.get_mut(&id).ok_or(DatabaseError::UnknownUserId(id))?;
        user.active = value;
        Ok(user.clone())
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn user(username: &str) -> User {
        User {
            username: username.into(),
            email: format!("{username}@example.com"),
            active: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_assigns_ids() {
        let db = MemoryDb::new();
        let first = db.users_create(user("first")).await.unwrap();
        let second = db.users_create(user("second")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(db.users_all().await.unwrap(), vec![first, second]);
    }

    #[tokio::test]
    async fn deleted_ids_are_not_reused() {
        let db = MemoryDb::new();
        db.users_create(user("alice")).await.unwrap();
        let bob = db.users_create(user("bob")).await.unwrap();
        assert!(db.users_delete(bob.id).await.unwrap());

        let carol = db.users_create(user("carol")).await.unwrap();
        assert_eq!(carol.id, 3);
        assert_eq!(db.users_get(bob.id).await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_get_distinct_ids() {
        let db = std::sync::Arc::new(MemoryDb::new());
        let handles: Vec<_> = (0..32)
            .map(|n| {
                let db = db.clone();
                tokio::spawn(async move { db.users_create(user(&format!("user{n}"))).await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let mut ids: Vec<_> = db
            .users_all()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.id)
            .collect();
        ids.dedup();
        assert_eq!(ids, (1..=32).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn create_rejects_duplicates() {
        let db = MemoryDb::new();
        db.users_create(user("me")).await.unwrap();

        assert!(matches!(
            db.users_create(user("me")).await,
            Err(DatabaseError::UserAlreadyExists(name)) if name == "me"
        ));
    }

    #[tokio::test]
    async fn lookups() {
        let db = MemoryDb::new();
        let me = db.users_create(user("me")).await.unwrap();

        assert_eq!(db.users_get(me.id).await.unwrap(), Some(me.clone()));
        assert_eq!(db.users_get(999).await.unwrap(), None);
        assert_eq!(
            db.users_get_by_username("me").await.unwrap(),
            Some(me.clone())
        );
        assert_eq!(
            db.users_get_by_email("me@example.com").await.unwrap(),
            Some(me)
        );
        assert!(matches!(
            db.users_get_by_username_expect("ghost").await,
            Err(DatabaseError::UnknownUser(_))
        ));
    }

    #[tokio::test]
    async fn update_and_delete() {
        let db = MemoryDb::new();
        let me = db.users_create(user("me")).await.unwrap();

        let me = db.users_set_active(me.id, false).await.unwrap();
        assert!(!me.active);
        assert!(!db.users_get_expect(me.id).await.unwrap().active);

        assert!(db.users_delete(me.id).await.unwrap());
        assert!(!db.users_delete(me.id).await.unwrap());
        assert!(matches!(
            db.users_update(me).await,
            Err(DatabaseError::UnknownUserId(1))
        ));
    }
}
