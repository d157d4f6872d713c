use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// An embedding does not have the dimension the index was built with.
    /// Signals a misconfigured embedding backend.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Persistence failed: {0}")]
    Persistence(String),

    #[error("Collaborator unavailable: {0}")]
    CollaboratorUnavailable(String),

    #[error("Collaborator timed out: {0}")]
    CollaboratorTimeout(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

/// Coarse classification of [`Error`], stable across message changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    DimensionMismatch,
    NotFound,
    Persistence,
    CollaboratorUnavailable,
    CollaboratorTimeout,
    InvalidConfig,
    InvalidQuery,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::DimensionMismatch { .. } => ErrorKind::DimensionMismatch,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Persistence(_) => ErrorKind::Persistence,
            Error::CollaboratorUnavailable(_) => ErrorKind::CollaboratorUnavailable,
            Error::CollaboratorTimeout(_) => ErrorKind::CollaboratorTimeout,
            Error::InvalidConfig(_) => ErrorKind::InvalidConfig,
            Error::InvalidQuery(_) => ErrorKind::InvalidQuery,
        }
    }

    /// True for failures of an external backend (embedding model or LLM).
    pub fn is_collaborator(&self) -> bool {
        matches!(self, Error::CollaboratorUnavailable(_) | Error::CollaboratorTimeout(_))
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self { Error::Persistence(e.to_string()) }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self { Error::Persistence(e.to_string()) }
}

pub type Result<T> = std::result::Result<T, Error>;
