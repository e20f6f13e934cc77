//! Validation utilities.

use std::fmt::Write;

use portal_config::{Config, DatabaseDriver, JobQueueDriver};
use portal_crypto::{MAX_COST, MIN_COST};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Errors on environment variables:\n{}", errors)]
    EnvVarsError { errors: String },
}

fn validate_env_vars(config: &Config) -> Result<(), ValidationError> {
    #[inline]
    fn _missing(error: &mut String, name: &str) {
        let _ = write!(error, "\n  - Missing env. var.: {}", name);
    }

    #[inline]
    fn _invalid(error: &mut String, name: &str, value: impl std::fmt::Display) {
        let _ = write!(error, "\n  - Invalid value for {}: {}", name, value);
    }

    let mut error = String::new();

    // Check server configuration
    if config.server.bind_ip.is_empty() {
        _missing(&mut error, "SERVER_BIND_IP");
    }
    if config.server.bind_port == 0 {
        _missing(&mut error, "SERVER_BIND_PORT");
    }
    if config.name.is_empty() {
        _missing(&mut error, "APP_NAME");
    }

    // Sessions cannot be signed without a key
    if config.session.secret_key.is_empty() {
        _missing(&mut error, "SECRET_KEY");
    }

    if !(MIN_COST..=MAX_COST).contains(&config.bcrypt_log_rounds) {
        _invalid(&mut error, "BCRYPT_LOG_ROUNDS", config.bcrypt_log_rounds);
    }

    if config.database.driver == DatabaseDriver::Postgres && config.database.pg.url.is_empty() {
        _missing(&mut error, "DATABASE_URL");
    }

    if config.jobs.driver == JobQueueDriver::Redis && config.jobs.redis_url.is_empty() {
        _missing(&mut error, "RQ_DEFAULT_URL");
    }
    if config.jobs.default_queue.is_empty() {
        _missing(&mut error, "RQ_DEFAULT_QUEUE");
    }

    if config.basic_auth.force && config.basic_auth.username.is_empty() {
        _missing(&mut error, "BASIC_AUTH_USERNAME");
    }

    if error.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::EnvVarsError { errors: error })
    }
}

/// Validate configuration.
pub fn validate_configuration(config: &Config) -> Result<(), ValidationError> {
    validate_env_vars(config)
}

#[cfg(test)]
mod tests {
    use portal_config::{Profile, Settings};
    use pretty_assertions::assert_eq;

    use super::*;

    fn config(profile: Profile, overrides: &[(&str, &str)]) -> Config {
        Config::resolve_from_settings(Some(profile), Settings::from_iter(overrides.iter().copied()))
            .unwrap()
    }

    fn errors(config: &Config) -> String {
        match validate_configuration(config) {
            Ok(()) => String::new(),
            Err(ValidationError::EnvVarsError { errors }) => errors,
        }
    }

    #[test]
    fn testing_profile_is_valid() {
        assert!(validate_configuration(&Config::testing().unwrap()).is_ok());
    }

    #[test]
    fn production_needs_secrets() {
        let config = config(Profile::Production, &[]);

        assert_eq!(
            errors(&config),
            "\n  - Missing env. var.: SECRET_KEY\n  - Missing env. var.: DATABASE_URL"
        );
    }

    #[test]
    fn production_with_secrets() {
        let config = config(
            Profile::Production,
            &[
                ("SECRET_KEY", "s3cr3t"),
                ("DATABASE_URL", "postgres://localhost/portal"),
            ],
        );

        assert!(validate_configuration(&config).is_ok());
    }

    #[test]
    fn invalid_values() {
        let config = config(
            Profile::Testing,
            &[
                ("BCRYPT_LOG_ROUNDS", "40"),
                ("BASIC_AUTH_FORCE", "true"),
                ("SERVER_BIND_PORT", "0"),
            ],
        );

        assert_eq!(
            errors(&config),
            concat!(
                "\n  - Missing env. var.: SERVER_BIND_PORT",
                "\n  - Invalid value for BCRYPT_LOG_ROUNDS: 40",
                "\n  - Missing env. var.: BASIC_AUTH_USERNAME"
            )
        );
    }
}
