use thiserror::Error;

/// Errors produced by name validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NameError {
    /// The container name violates the backend's naming rules.
    #[error("invalid container name: {name}: {reason}")]
    InvalidContainerName { name: String, reason: String },

    /// The blob name violates the backend's naming rules.
    #[error("invalid blob name: {name}: {reason}")]
    InvalidBlobName { name: String, reason: String },
}
