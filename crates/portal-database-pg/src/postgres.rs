use async_trait::async_trait;
use portal_database_interface::{DatabaseError, DbService, Result};
use portal_models::User;
use sqlx::{PgPool, Row};

use crate::row::UserRow;

pub struct PostgresDb {
    pool: PgPool,
}

impl PostgresDb {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn wrap_error(e: sqlx::Error) -> DatabaseError {
        DatabaseError::ImplementationError { source: e.into() }
    }

    fn wrap_unique_violation(e: sqlx::Error, username: &str) -> DatabaseError {
        match &e {
            sqlx::Error::Database(db_error) if db_error.is_unique_violation() => {
                DatabaseError::UserAlreadyExists(username.into())
            }
            _ => Self::wrap_error(e),
        }
    }

    /// Primary keys are `SERIAL`, so anything above `i32::MAX` matches no row.
    fn row_id(id: u64) -> Option<i32> {
        i32::try_from(id).ok()
    }

    async fn users_get_where(&self, column: &str, value: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            SELECT *
            FROM users
            WHERE {column} = $1
        "#
        ))
        .bind(value)
        .fetch_optional(&self.pool)
        .await
        .map_err(Self::wrap_error)?;

        Ok(row.map(Into::into))
    }
}

#[async_trait]
impl DbService for PostgresDb {
    #[tracing::instrument(skip_all, fields(username = %instance.username))]
    async fn users_create(&self, instance: User) -> Result<User> {
        let id: i32 = sqlx::query(
            r#"
            INSERT INTO users
            (
                username,
                email,
                password_hash,
                active
            )
            VALUES
            (
                $1,
                $2,
                $3,
                $4
            )
            RETURNING id
            ;
        "#,
        )
        .bind(&instance.username)
        .bind(&instance.email)
        .bind(&instance.password_hash)
        .bind(instance.active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::wrap_unique_violation(e, &instance.username))?
        .get(0);

        self.users_get_expect(id as u64).await
    }

    #[tracing::instrument(skip_all, fields(id = instance.id))]
    async fn users_update(&self, instance: User) -> Result<User> {
        let Some(row_id) = Self::row_id(instance.id) else {
            return Err(DatabaseError::UnknownUserId(instance.id));
        };

        let result = sqlx::query(
            r#"
            UPDATE users
            SET username = $1,
                email = $2,
                password_hash = $3,
                active = $4
            WHERE id = $5
        "#,
        )
        .bind(&instance.username)
        .bind(&instance.email)
        .bind(&instance.password_hash)
        .bind(instance.active)
        .bind(row_id)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::wrap_unique_violation(e, &instance.username))?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::UnknownUserId(instance.id));
        }

        self.users_get_expect(instance.id).await
    }

    #[tracing::instrument(skip(self))]
    async fn users_all(&self) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT *
            FROM users
            ORDER BY id
        "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Self::wrap_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[tracing::instrument(skip(self), ret)]
    async fn users_get(&self, id: u64) -> Result<Option<User>> {
        let Some(row_id) = Self::row_id(id) else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT *
            FROM users
            WHERE id = $1
        "#,
        )
        .bind(row_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Self::wrap_error)?;

        Ok(row.map(Into::into))
    }

    #[tracing::instrument(skip(self))]
    async fn users_get_by_username(&self, username: &str) -> Result<Option<User>> {
        self.users_get_where("username", username).await
    }

    #[tracing::instrument(skip(self))]
    async fn users_get_by_email(&self, email: &str) -> Result<Option<User>> {
        self.users_get_where("email", email).await
    }

    #[tracing::instrument(skip(self))]
    async fn users_delete(&self, id: u64) -> Result<bool> {
        let Some(row_id) = Self::row_id(id) else {
            return Ok(false);
        };

        let result = sqlx::query(
            r#"
            DELETE FROM users
            WHERE id = $1
        "#,
        )
        .bind(row_id)
        .execute(&self.pool)
        .await
        .map_err(Self::wrap_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self))]
    async fn users_set_active(&self, id: u64, value: bool) -> Result<User> {
        let Some(row_id) = Self::row_id(id) else {
            return Err(DatabaseError::UnknownUserId(id));
        };

        let result = sqlx::query(
            r#"
            UPDATE users
            SET active = $1
            WHERE id = $2
        "#,
        )
        .bind(value)
        .bind(row_id)
        .execute(&self.pool)
        .await
        .map_err(Self::wrap_error)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::UnknownUserId(id));
        }

        self.users_get_expect(id).await
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1;")
            .execute(&self.pool)
            .await
            .map_err(Self::wrap_error)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use portal_config::Config;
    use pretty_assertions::assert_eq;
    use sqlx::postgres::PgPoolOptions;

    use super::*;
    use crate::{create_db_url, get_base_url, setup_test_db, teardown_test_db};

    async fn with_test_db<F, Fut>(test_name: &str, block: F)
    where
        F: FnOnce(PostgresDb) -> Fut,
        Fut: std::future::Future<Output = ()>,
    {
        let config = Config::testing().unwrap();
        let url = std::env::var("DATABASE_URL").unwrap_or(config.database.pg.url);
        let base_url = get_base_url(&url);
        let db_name = format!("test-portal-{test_name}");

        setup_test_db(&base_url, &db_name).await;
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(&create_db_url(&base_url, &db_name))
            .await
            .unwrap();
        block(PostgresDb::new(pool)).await;
        teardown_test_db(&base_url, &db_name).await;
    }

    #[tokio::test]
    async fn out_of_range_ids_match_nothing() {
        // Never connects: out-of-range ids are answered before any query.
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/portal-unreachable")
            .unwrap();
        let db = PostgresDb::new(pool);
        let id = u64::from(u32::MAX) + 2;

        assert_eq!(db.users_get(id).await.unwrap(), None);
        assert!(!db.users_delete(id).await.unwrap());
        assert!(matches!(
            db.users_set_active(id, false).await,
            Err(DatabaseError::UnknownUserId(i)) if i == id
        ));
        assert!(matches!(
            db.users_update(User {
                id,
                ..Default::default()
            })
            .await,
            Err(DatabaseError::UnknownUserId(i)) if i == id
        ));
    }

    #[tokio::test]
    #[ignore]
    async fn users_roundtrip() {
        with_test_db("users_roundtrip", |db| async move {
            let me = db
                .users_create(User {
                    username: "me".into(),
                    email: "me@example.com".into(),
                    active: true,
                    ..Default::default()
                })
                .await
                .unwrap();

            assert_eq!(db.users_get(me.id).await.unwrap(), Some(me.clone()));
            assert_eq!(db.users_get(me.id + 100).await.unwrap(), None);
            assert_eq!(db.users_get(me.id + (1 << 32)).await.unwrap(), None);
            assert!(matches!(
                db.users_create(me.clone()).await,
                Err(DatabaseError::UserAlreadyExists(_))
            ));

            let me = db.users_set_active(me.id, false).await.unwrap();
            assert!(!me.active);
            assert!(db.users_delete(me.id).await.unwrap());
            db.health_check().await.unwrap();
        })
        .await;
    }
}
