use thiserror::Error;

/// Why a fetch was refused. Checks run in declaration order and the first
/// failing one is reported.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    #[error("file belongs to another owner")]
    OwnerMismatch,

    #[error("access code is missing or wrong")]
    CodeMismatch,
}

#[derive(Error, Debug)]
pub enum DropError {
    #[error("Credential required")]
    CredentialMissing,

    #[error("Duplicate file id: {0}")]
    DuplicateId(String),

    /// Never existed and already expired look the same.
    #[error("File not found")]
    NotFound,

    #[error("Unauthorized: {0}")]
    Unauthorized(Denial),

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("File size {size} bytes exceeds maximum allowed {max} bytes")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("Storage error: {0}")]
    Storage(#[from] sea_orm::DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<Denial> for DropError {
    fn from(denial: Denial) -> Self {
        DropError::Unauthorized(denial)
    }
}

pub type DropResult<T> = Result<T, DropError>;
