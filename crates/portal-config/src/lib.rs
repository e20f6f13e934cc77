//! Config module.

mod drivers;
mod errors;
mod profiles;
mod settings;

use std::{env, path::Path, str::FromStr};

pub use drivers::{DatabaseDriver, JobQueueDriver};
pub use errors::{ConfigError, Result};
pub use profiles::{Profile, PROFILES};
pub use settings::Settings;

/// Name of the setting selecting the profile.
pub const APP_ENV: &str = "APP_ENV";
/// Default env file name.
pub const DEFAULT_ENV_FILE: &str = ".env";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Database driver.
    pub driver: DatabaseDriver,
    /// Postgres options.
    pub pg: DatabasePgConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabasePgConfig {
    /// Database URL.
    pub url: String,
    /// Database pool size.
    pub pool_size: u32,
    /// Database connection timeout (in seconds)
    pub connection_timeout: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobQueueConfig {
    /// Job queue driver.
    pub driver: JobQueueDriver,
    /// Redis URL.
    pub redis_url: String,
    /// Queue used when none is given.
    pub default_queue: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicAuthConfig {
    pub username: String,
    pub password: String,
    /// Realm sent in the challenge header.
    pub realm: String,
    /// Guard every route, not only the ones asking for it.
    pub force: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Server bind IP.
    pub bind_ip: String,
    /// Server bind port.
    pub bind_port: u16,
    /// Server workers count.
    pub workers_count: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Key used to sign session cookies.
    pub secret_key: String,
    /// Only send the session cookie over HTTPS.
    pub cookie_secure: bool,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Application name.
    pub name: String,
    /// Selected profile.
    pub profile: Profile,
    /// Debug mode.
    pub debug: bool,
    /// Testing mode.
    pub testing: bool,
    /// Bcrypt cost.
    pub bcrypt_log_rounds: u32,
    /// Expose debug toolbar routes.
    pub debug_toolbar_enabled: bool,
    pub session: SessionConfig,
    pub database: DatabaseConfig,
    pub jobs: JobQueueConfig,
    pub basic_auth: BasicAuthConfig,
    pub server: ServerConfig,
    /// Resolved raw settings.
    pub settings: Settings,
    /// App version
    pub version: String,
}

impl Config {
    /// Resolve configuration from the default env file and `APP_ENV`.
    pub fn from_env(version: String) -> Result<Config> {
        let mut config = Self::resolve(None, DEFAULT_ENV_FILE)?;
        config.version = version;
        Ok(config)
    }

    /// Resolve configuration from a profile and an env file.
    ///
    /// Without an explicit profile, `APP_ENV` picks one.
    pub fn resolve<P: AsRef<Path>>(profile: Option<Profile>, env_file: P) -> Result<Config> {
        let overrides = Settings::from_env_file(env_file.as_ref())?;
        Self::resolve_from_settings(profile, overrides)
    }

    /// Merge env-file settings over profile defaults.
    pub fn resolve_from_settings(profile: Option<Profile>, overrides: Settings) -> Result<Config> {
        let profile = match profile {
            Some(profile) => profile,
            None => {
                let app_env = overrides
                    .get(APP_ENV)
                    .map(str::to_owned)
                    .or_else(|| env::var(APP_ENV).ok());
                select_profile(app_env.as_deref())?
            }
        };

        let mut settings = profile.defaults();
        settings.merge(overrides);
        Self::from_settings(profile, settings)
    }

    /// Testing configuration, without any env file.
    pub fn testing() -> Result<Config> {
        Self::resolve_from_settings(Some(Profile::Testing), Settings::new())
    }

    /// Build typed configuration from merged settings.
    pub fn from_settings(profile: Profile, settings: Settings) -> Result<Config> {
        Ok(Config {
            name: settings.to_str("APP_NAME", "portal"),
            profile,
            debug: settings.to_bool("DEBUG", false),
            testing: settings.to_bool("TESTING", false),
            bcrypt_log_rounds: settings.to_u32("BCRYPT_LOG_ROUNDS", 12),
            debug_toolbar_enabled: settings.to_bool("DEBUG_TB_ENABLED", false),
            session: SessionConfig {
                secret_key: settings.to_str("SECRET_KEY", ""),
                cookie_secure: settings.to_bool("SESSION_COOKIE_SECURE", false),
            },
            database: DatabaseConfig {
                driver: DatabaseDriver::from_str(&settings.to_str("DATABASE_DRIVER", "pg"))?,
                pg: DatabasePgConfig {
                    url: settings.to_str("DATABASE_URL", ""),
                    pool_size: settings.to_u32("DATABASE_POOL_SIZE", 10),
                    connection_timeout: settings.to_u32("DATABASE_CONNECTION_TIMEOUT", 5),
                },
            },
            jobs: JobQueueConfig {
                driver: JobQueueDriver::from_str(&settings.to_str("RQ_DRIVER", "redis"))?,
                redis_url: settings.to_str("RQ_DEFAULT_URL", "redis://localhost:6379/0"),
                default_queue: settings.to_str("RQ_DEFAULT_QUEUE", "default"),
            },
            basic_auth: BasicAuthConfig {
                username: settings.to_str("BASIC_AUTH_USERNAME", ""),
                password: settings.to_str("BASIC_AUTH_PASSWORD", ""),
                realm: settings.to_str("BASIC_AUTH_REALM", ""),
                force: settings.to_bool("BASIC_AUTH_FORCE", false),
            },
            server: ServerConfig {
                bind_ip: settings.to_str("SERVER_BIND_IP", "127.0.0.1"),
                bind_port: settings.to_u16("SERVER_BIND_PORT", 5000),
                workers_count: settings.to_optional_u16("SERVER_WORKERS_COUNT", None),
            },
            settings,
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }
}

/// Pick the profile registered for an `APP_ENV` value.
pub fn select_profile(app_env: Option<&str>) -> Result<Profile> {
    match app_env {
        Some(name) => Profile::lookup(name),
        None => Err(ConfigError::MissingAppEnv),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    fn env_file(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file
    }

    #[test]
    fn profile_defaults_overridden_by_env_file() {
        let file = env_file(&["SECRET_KEY=from-env-file", "SERVER_BIND_PORT=9000"]);

        for (_, profile) in PROFILES {
            let config = Config::resolve(Some(*profile), file.path()).unwrap();

            let mut expected = profile.defaults();
            expected.set("SECRET_KEY", "from-env-file");
            expected.set("SERVER_BIND_PORT", "9000");

            assert_eq!(config.settings, expected);
            assert_eq!(config.session.secret_key, "from-env-file");
            assert_eq!(config.server.bind_port, 9000);
            assert_eq!(config.profile, *profile);
        }
    }

    #[test]
    fn profile_selected_from_env_file() {
        let file = env_file(&["APP_ENV=testing"]);
        let config = Config::resolve(None, file.path()).unwrap();

        assert_eq!(config.profile, Profile::Testing);
        assert!(config.testing);
        assert_eq!(config.database.driver, DatabaseDriver::Memory);
        assert_eq!(config.jobs.driver, JobQueueDriver::Memory);
    }

    #[test]
    fn unknown_app_env() {
        let file = env_file(&["APP_ENV=moon"]);
        assert!(matches!(
            Config::resolve(None, file.path()),
            Err(ConfigError::UnknownProfile { name }) if name == "moon"
        ));
    }

    #[test]
    fn missing_app_env() {
        assert!(matches!(select_profile(None), Err(ConfigError::MissingAppEnv)));
    }

    #[test]
    fn invalid_driver() {
        let overrides = Settings::from_iter([("DATABASE_DRIVER", "mongo")]);
        assert!(matches!(
            Config::resolve_from_settings(Some(Profile::Testing), overrides),
            Err(ConfigError::InvalidDriverKind { .. })
        ));
    }

    #[test]
    fn resolution_is_idempotent() {
        let file = env_file(&["APP_ENV=production", "BASIC_AUTH_USERNAME=admin"]);

        let first = Config::resolve(None, file.path()).unwrap();
        let second = Config::resolve(None, file.path()).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.basic_auth.username, "admin");
        assert_eq!(first.bcrypt_log_rounds, 13);
    }

    #[test]
    fn testing_config() {
        let config = Config::testing().unwrap();
        assert!(config.testing);
        assert!(config.debug);
        assert_eq!(config.bcrypt_log_rounds, 4);
        assert!(!config.debug_toolbar_enabled);
    }
}
