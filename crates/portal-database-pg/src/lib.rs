mod postgres;
mod row;
mod utils;

use std::{ops::Deref, time::Duration};

use portal_config::Config;
use portal_database_interface::{DatabaseError, Result};
use sqlx::{migrate::Migrate, postgres::PgPoolOptions, Acquire};

pub type DbPool = sqlx::postgres::PgPool;
pub use postgres::PostgresDb;
use tracing::info;
pub use utils::{create_db_url, get_base_url, setup_test_db, teardown_test_db};

pub async fn run_migrations<'a, A>(migrator: A) -> Result<()>
where
    A: Acquire<'a>,
    <A::Connection as Deref>::Target: Migrate,
{
    info!("Running database migrations...");

    sqlx::migrate!("./migrations")
        .run(migrator)
        .await
        .map_err(|e| DatabaseError::ImplementationError { source: e.into() })?;

    Ok(())
}

fn pool_options(config: &Config) -> PgPoolOptions {
    PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(
            config.database.pg.connection_timeout.into(),
        ))
        .max_connections(config.database.pg.pool_size)
}

pub async fn establish_pool_connection(config: &Config) -> Result<DbPool> {
    info!("Establishing connection to database pool...");

    pool_options(config)
        .connect(&config.database.pg.url)
        .await
        .map_err(|e| DatabaseError::ImplementationError { source: e.into() })
}

/// Create a pool without opening any connection.
///
/// Connections are opened on first use.
pub fn establish_lazy_pool(config: &Config) -> Result<DbPool> {
    info!("Binding lazy database pool...");

    pool_options(config)
        .connect_lazy(&config.database.pg.url)
        .map_err(|e| DatabaseError::ImplementationError { source: e.into() })
}

#[cfg(test)]
mod tests {
    use portal_config::{Config, Profile, Settings};

    use super::*;

    #[tokio::test]
    async fn lazy_pool_does_not_connect() {
        let overrides = Settings::from_iter([
            ("DATABASE_DRIVER", "pg"),
            ("DATABASE_URL", "postgres://nobody@127.0.0.1:1/nowhere"),
        ]);
        let config = Config::resolve_from_settings(Some(Profile::Testing), overrides).unwrap();

        let pool = establish_lazy_pool(&config).unwrap();
        assert_eq!(pool.size(), 0);
    }

    #[tokio::test]
    async fn lazy_pool_rejects_invalid_url() {
        let overrides = Settings::from_iter([("DATABASE_URL", "not a url")]);
        let config = Config::resolve_from_settings(Some(Profile::Testing), overrides).unwrap();

        assert!(establish_lazy_pool(&config).is_err());
    }
}
