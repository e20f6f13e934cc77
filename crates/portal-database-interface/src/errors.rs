use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Unknown user ID '{0}'")]
    UnknownUserId(u64),

    #[error("Unknown user '{0}'")]
    UnknownUser(String),

    #[error("User '{0}' already exists")]
    UserAlreadyExists(String),

    #[error(transparent)]
    ImplementationError {
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

pub type Result<T, E = DatabaseError> = core::result::Result<T, E>;
