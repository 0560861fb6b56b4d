//! Repository error type and the stable error-kind taxonomy.

use shirokuma_core::validation::ValidationError;
use shirokuma_markdown::MarkdownError;
use shirokuma_storage::StorageError;

/// Stable error kinds surfaced to callers (tools map them to error codes,
/// the CLI to exit codes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Reference,
    Integrity,
    Internal,
}

/// Errors from repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Markdown(#[from] MarkdownError),

    /// Not-found with a caller-facing message
    /// (`<type> with ID <id> not found`, `Type "<name>" does not exist`).
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// Reference violations: current-state targets that do not exist,
    /// `change_item_type` across base types or on reserved types.
    #[error("{0}")]
    Reference(String),

    /// Index/projection consistency failures.
    #[error("{0}")]
    Integrity(String),

    /// A long-running operation observed its cancellation flag.
    #[error("operation cancelled")]
    Cancelled,

    #[error("internal error: {0}")]
    Internal(String),
}

/// Convenience alias used throughout the repository crate.
pub type Result<T> = std::result::Result<T, RepoError>;

impl RepoError {
    pub fn item_not_found(type_name: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{type_name} with ID {id} not found"))
    }

    pub fn type_not_found(name: &str) -> Self {
        Self::NotFound(format!("Type \"{name}\" does not exist"))
    }

    /// The stable kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Reference(_) => ErrorKind::Reference,
            Self::Integrity(_) | Self::Markdown(_) => ErrorKind::Integrity,
            Self::Cancelled | Self::Internal(_) => ErrorKind::Internal,
            Self::Storage(e) => match e {
                StorageError::NotFound { .. } => ErrorKind::NotFound,
                StorageError::Validation { .. } => ErrorKind::Validation,
                StorageError::Conflict { .. } => ErrorKind::Conflict,
                StorageError::Reference { .. } => ErrorKind::Reference,
                StorageError::Integrity { .. } => ErrorKind::Integrity,
                _ => ErrorKind::Internal,
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}
