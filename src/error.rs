use thiserror::Error;

/// Failure reported by a storage engine. The message is the engine's own text.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct BackendError {
    pub message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<rusqlite::Error> for BackendError {
    fn from(e: rusqlite::Error) -> Self {
        BackendError::new(e.to_string())
    }
}

impl From<tokio_postgres::Error> for BackendError {
    fn from(e: tokio_postgres::Error) -> Self {
        match e.as_db_error() {
            Some(db) => BackendError::new(db.message()),
            None => BackendError::new(e.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("unable to open embedded database {path}: {source}")]
    Embedded {
        path: String,
        #[source]
        source: BackendError,
    },
    #[error("server connection failed: {0}")]
    Server(BackendError),
    #[error("server connection timed out after {0}s")]
    Timeout(u64),
    #[error("tls setup failed: {0}")]
    Tls(String),
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("provider '{0}' unavailable")]
    ProviderUnavailable(String),
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        LlmError::Http(e.to_string())
    }
}

/// Failures of a single question-to-answer pass.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Unable to retrieve database schema")]
    SchemaUnavailable,
    #[error("Error generating SQL: {0}")]
    Generation(#[from] LlmError),
    #[error("SQL execution error: {0}")]
    Execution(String),
}

impl From<BackendError> for QueryError {
    fn from(e: BackendError) -> Self {
        QueryError::Execution(e.message)
    }
}

impl From<ConnectionError> for QueryError {
    fn from(e: ConnectionError) -> Self {
        QueryError::Execution(e.to_string())
    }
}
