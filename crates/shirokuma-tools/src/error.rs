//! Tool-surface error type with stable codes.

use shirokuma_repo::{ErrorKind, RepoError};

/// Errors surfaced by tool dispatch.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The tool name is unknown -- including the deliberately absent
    /// status CRUD tools.
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    /// The parameters did not match the tool's closed schema (unknown key,
    /// wrong type, missing required field).
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// The underlying operation failed.
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Convenience alias for tool dispatch.
pub type Result<T> = std::result::Result<T, ToolError>;

impl ToolError {
    /// The stable error code clients branch on.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ToolNotFound(_) => "ToolNotFound",
            Self::InvalidParams(_) => "ValidationError",
            Self::Repo(e) => match e.kind() {
                ErrorKind::Validation => "ValidationError",
                ErrorKind::NotFound => "NotFoundError",
                ErrorKind::Conflict => "ConflictError",
                ErrorKind::Reference => "ReferenceError",
                ErrorKind::Integrity => "IntegrityError",
                ErrorKind::Internal => "InternalError",
            },
        }
    }
}
