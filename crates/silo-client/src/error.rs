use silo_backend::BackendError;
use silo_schema::{SchemaError, Violation};
use silo_types::NameError;
use thiserror::Error;

/// Errors surfaced by Silo storage operations.
///
/// Every failure carries a discriminable kind so calling code can branch
/// without string matching. Backend identity mismatches are translated to
/// their own variants; everything else from the backend passes through
/// unchanged as [`StorageError::Backend`]. The ETag-conflict case never
/// appears here directly — the update engine consumes it as its retry
/// signal and reports exhaustion as [`StorageError::ConcurrentUpdate`].
#[derive(Debug, Error)]
pub enum StorageError {
    /// A container or blob name was rejected before any backend call.
    #[error("invalid name: {name}: {reason}")]
    InvalidName { name: String, reason: String },

    /// The schema document attached at container creation is malformed.
    #[error("invalid schema document: {reason}")]
    InvalidSchema { reason: String },

    /// The document does not satisfy the container's bound schema.
    ///
    /// Checked before any write is attempted; committed remote state and
    /// cached state are left unchanged. Recoverable by fixing the input.
    #[error("schema validation failed with {} violation(s)", violations.len())]
    SchemaValidation { violations: Vec<Violation> },

    /// The update engine exhausted its retry budget under sustained write
    /// contention. The caller may retry the whole operation.
    #[error("update of {name} lost to concurrent writers after {attempts} attempt(s)")]
    ConcurrentUpdate { name: String, attempts: u32 },

    /// A container with this name already exists.
    #[error("container already exists: {name}")]
    ContainerExists { name: String },

    /// The container was not found.
    #[error("container not found: {name}")]
    ContainerNotFound { name: String },

    /// A blob with this name already exists.
    #[error("blob already exists: {name}")]
    BlobExists { name: String },

    /// The blob was not found.
    #[error("blob not found: {name}")]
    BlobNotFound { name: String },

    /// Canonical JSON encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Any other backend failure, propagated unchanged.
    #[error("backend error: {0}")]
    Backend(#[source] BackendError),
}

impl From<BackendError> for StorageError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::ContainerExists { name } => Self::ContainerExists { name },
            BackendError::ContainerNotFound { name } => Self::ContainerNotFound { name },
            BackendError::BlobExists { container, name } => Self::BlobExists {
                name: format!("{container}/{name}"),
            },
            BackendError::BlobNotFound { container, name } => Self::BlobNotFound {
                name: format!("{container}/{name}"),
            },
            other => Self::Backend(other),
        }
    }
}

impl From<NameError> for StorageError {
    fn from(err: NameError) -> Self {
        match err {
            NameError::InvalidContainerName { name, reason }
            | NameError::InvalidBlobName { name, reason } => Self::InvalidName { name, reason },
        }
    }
}

impl From<SchemaError> for StorageError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::InvalidSchema { reason } => Self::InvalidSchema { reason },
            SchemaError::Validation { violations } => Self::SchemaValidation { violations },
        }
    }
}

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
