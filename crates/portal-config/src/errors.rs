use thiserror::Error;

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No configuration profile found for APP_ENV '{name}'")]
    UnknownProfile { name: String },

    #[error("APP_ENV is not set and no configuration profile was given")]
    MissingAppEnv,

    #[error("Invalid driver kind for {setting}: {kind}")]
    InvalidDriverKind { setting: String, kind: String },

    #[error("Could not read env file '{path}',\n  caused by: {source}")]
    EnvFileError { path: String, source: dotenv::Error },
}

/// Result alias for `ConfigError`.
pub type Result<T, E = ConfigError> = core::result::Result<T, E>;
