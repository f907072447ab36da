//! The [`BlobBackend`] trait defining the storage capability surface.
//!
//! Any backend (in-memory, filesystem, remote object store) implements this
//! trait to provide container/blob storage with ETag-guarded writes. The
//! wire protocol behind an implementation is out of scope here; the trait
//! is the whole contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use silo_types::ETag;

use crate::error::BackendResult;

/// One blob in a listing: identity and current version, content not loaded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobEntry {
    /// Blob name, unique within its container.
    pub name: String,
    /// ETag of the blob's current committed version.
    pub etag: ETag,
}

/// Named-blob storage with containers and conditional writes.
///
/// Implementations must be thread-safe (`Send + Sync`). Every call is a
/// suspension point; callers may cancel by dropping the future, and a
/// cancelled conditional write either committed or left the blob untouched.
///
/// All implementations must satisfy these invariants:
/// - Every successful write returns a fresh ETag that no earlier write of
///   the same blob has returned.
/// - `write_blob_if_match` commits if and only if the blob's current ETag
///   equals `expected`; at most one contender can commit against a given
///   expected ETag.
/// - Errors use the closed [`BackendError`](crate::BackendError) taxonomy;
///   the backend never retries on the caller's behalf.
#[async_trait]
pub trait BlobBackend: Send + Sync {
    /// Register a new container, optionally recording the reference to its
    /// bound schema alongside the container entity.
    ///
    /// Fails with `ContainerExists` if the name is taken.
    async fn create_container(&self, name: &str, schema_ref: Option<&str>) -> BackendResult<()>;

    /// Remove a container and all blobs it holds.
    ///
    /// Fails with `ContainerNotFound` if absent.
    async fn delete_container(&self, name: &str) -> BackendResult<()>;

    /// Create a new blob with the given content.
    ///
    /// Unconditional create: fails with `BlobExists` if the name is taken,
    /// `ContainerNotFound` if the container is absent. Returns the ETag of
    /// the newly committed version.
    async fn create_blob(&self, container: &str, name: &str, bytes: &[u8]) -> BackendResult<ETag>;

    /// Read a blob's current content and ETag.
    ///
    /// Fails with `BlobNotFound` / `ContainerNotFound`.
    async fn read_blob(&self, container: &str, name: &str) -> BackendResult<(Vec<u8>, ETag)>;

    /// Replace a blob's content if and only if its current ETag equals
    /// `expected` (if-match semantics).
    ///
    /// On success returns the new ETag. Fails with `PreconditionFailed`
    /// when another writer has committed since `expected` was observed,
    /// `BlobNotFound` / `ContainerNotFound` on identity mismatch.
    async fn write_blob_if_match(
        &self,
        container: &str,
        name: &str,
        bytes: &[u8],
        expected: &ETag,
    ) -> BackendResult<ETag>;

    /// Delete a blob.
    ///
    /// Fails with `BlobNotFound` / `ContainerNotFound`.
    async fn delete_blob(&self, container: &str, name: &str) -> BackendResult<()>;

    /// List blobs whose name starts with `prefix`, sorted by name.
    ///
    /// Pass `""` to list every blob in the container. Content is not
    /// loaded; each entry carries name and current ETag only.
    async fn list_blobs(&self, container: &str, prefix: &str) -> BackendResult<Vec<BlobEntry>>;
}
