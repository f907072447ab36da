use thiserror::Error;

/// Errors from backend storage operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BackendError {
    /// A container with this name already exists.
    #[error("container already exists: {name}")]
    ContainerExists { name: String },

    /// The container was not found.
    #[error("container not found: {name}")]
    ContainerNotFound { name: String },

    /// A blob with this name already exists in the container.
    #[error("blob already exists: {container}/{name}")]
    BlobExists { container: String, name: String },

    /// The blob was not found in the container.
    #[error("blob not found: {container}/{name}")]
    BlobNotFound { container: String, name: String },

    /// A conditional write was rejected: the blob's remote ETag no longer
    /// matches the expected one. Another writer committed first.
    #[error("precondition failed: {container}/{name} changed since it was read")]
    PreconditionFailed { container: String, name: String },

    /// Transport or availability failure talking to the backend.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// Result alias for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;
