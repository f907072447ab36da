//! Name validation for containers and blobs.
//!
//! Valid container names:
//! - 3 to 63 characters
//! - Lowercase letters, digits, and dashes only
//! - Must start and end with a letter or digit
//! - Must not contain consecutive dashes (`--`)
//!
//! Valid blob names:
//! - Non-empty, at most 1024 characters
//! - No control characters
//! - Must not start or end with `/`
//!
//! Names are checked before any backend call, so an invalid name never
//! reaches the wire.

use crate::error::NameError;

/// Minimum container name length.
pub const CONTAINER_NAME_MIN: usize = 3;
/// Maximum container name length.
pub const CONTAINER_NAME_MAX: usize = 63;
/// Maximum blob name length.
pub const BLOB_NAME_MAX: usize = 1024;

/// Validate a container name, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use silo_types::validate_container_name;
///
/// assert!(validate_container_name("test-container").is_ok());
/// assert!(validate_container_name("ab").is_err());
/// assert!(validate_container_name("Uppercase").is_err());
/// ```
pub fn validate_container_name(name: &str) -> Result<(), NameError> {
    let len = name.chars().count();
    if len < CONTAINER_NAME_MIN || len > CONTAINER_NAME_MAX {
        return Err(NameError::InvalidContainerName {
            name: name.to_string(),
            reason: format!(
                "length must be between {CONTAINER_NAME_MIN} and {CONTAINER_NAME_MAX} characters"
            ),
        });
    }

    for ch in name.chars() {
        if !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-') {
            return Err(NameError::InvalidContainerName {
                name: name.to_string(),
                reason: format!("contains forbidden character: {ch:?}"),
            });
        }
    }

    // Boundary characters must be alphanumeric.
    if name.starts_with('-') || name.ends_with('-') {
        return Err(NameError::InvalidContainerName {
            name: name.to_string(),
            reason: "must not start or end with '-'".into(),
        });
    }

    if name.contains("--") {
        return Err(NameError::InvalidContainerName {
            name: name.to_string(),
            reason: "must not contain consecutive dashes '--'".into(),
        });
    }

    Ok(())
}

/// Validate a blob name, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use silo_types::validate_blob_name;
///
/// assert!(validate_blob_name("state/worker-7.json").is_ok());
/// assert!(validate_blob_name("").is_err());
/// ```
pub fn validate_blob_name(name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::InvalidBlobName {
            name: name.to_string(),
            reason: "blob name must not be empty".into(),
        });
    }

    if name.chars().count() > BLOB_NAME_MAX {
        return Err(NameError::InvalidBlobName {
            name: name.to_string(),
            reason: format!("length must be at most {BLOB_NAME_MAX} characters"),
        });
    }

    if name.chars().any(char::is_control) {
        return Err(NameError::InvalidBlobName {
            name: name.to_string(),
            reason: "must not contain control characters".into(),
        });
    }

    if name.starts_with('/') || name.ends_with('/') {
        return Err(NameError::InvalidBlobName {
            name: name.to_string(),
            reason: "must not start or end with '/'".into(),
        });
    }

    Ok(())
}
