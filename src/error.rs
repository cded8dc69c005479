use thiserror::Error;

/// Failures raised by an [`EntityStore`](crate::services::store::EntityStore).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} with id {id} not found")]
    NotFound { kind: &'static str, id: String },

    #[error("database connection lock was poisoned")]
    Poisoned,

    #[error("store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Database(#[from] anyhow::Error),
}

impl StoreError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Database(err.into())
    }
}

/// Everything that can stop a palette query from producing an outcome.
#[derive(Debug, Error)]
pub enum IntentError {
    #[error("no matching action")]
    NoMatchFound,

    #[error("Intent \"{0}\" not found")]
    UnknownIntent(String),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntentError {
    pub fn validation(message: impl Into<String>) -> Self {
        IntentError::Validation(message.into())
    }
}
