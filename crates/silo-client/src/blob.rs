//! Blob handles: the raw and structured variants.
//!
//! Both variants share the same identity core (backend handle, container,
//! name, recorded ETag) and differ only in how they treat content:
//! [`BlockBlob`] exposes raw bytes, [`DataBlockBlob`] layers canonical JSON
//! encoding, schema enforcement, and an optional content cache on top.
//!
//! A handle's cache is its own: two independently obtained handles for the
//! same remote blob cache independently, and a write through one does not
//! refresh the other.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use silo_backend::BlobBackend;
use silo_schema::SchemaRegistry;
use silo_types::ETag;
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::update::{UpdateEngine, UpdateOptions};

/// The one canonical encoding of a structured document.
pub(crate) fn encode_document(document: &Value) -> StorageResult<Vec<u8>> {
    serde_json::to_vec(document).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Decode a blob's bytes back into a structured document.
pub(crate) fn decode_document(bytes: &[u8]) -> StorageResult<Value> {
    serde_json::from_slice(bytes).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Identity and version state shared by every blob variant.
#[derive(Clone)]
pub(crate) struct BlobCore {
    pub backend: Arc<dyn BlobBackend>,
    pub container: String,
    pub name: String,
    /// ETag under which this handle last confirmed the blob current.
    pub etag: Option<ETag>,
}

// ---------------------------------------------------------------------------
// BlockBlob
// ---------------------------------------------------------------------------

/// Handle to a raw blob: named bytes plus the ETag they were read under.
pub struct BlockBlob {
    core: BlobCore,
}

impl BlockBlob {
    pub(crate) fn new(
        backend: Arc<dyn BlobBackend>,
        container: &str,
        name: &str,
        etag: Option<ETag>,
    ) -> Self {
        Self {
            core: BlobCore {
                backend,
                container: container.to_string(),
                name: name.to_string(),
                etag,
            },
        }
    }

    /// Blob name, unique within its container.
    pub fn name(&self) -> &str {
        &self.core.name
    }

    /// Name of the owning container.
    pub fn container_name(&self) -> &str {
        &self.core.container
    }

    /// ETag recorded by the most recent create or load through this handle.
    pub fn etag(&self) -> Option<&ETag> {
        self.core.etag.as_ref()
    }

    /// Fetch the blob's current bytes, refreshing the recorded ETag.
    pub async fn load(&mut self) -> StorageResult<Vec<u8>> {
        let (bytes, etag) = self
            .core
            .backend
            .read_blob(&self.core.container, &self.core.name)
            .await?;
        self.core.etag = Some(etag);
        Ok(bytes)
    }

    /// Remove the blob. Fails with `BlobNotFound` if already absent.
    pub async fn delete(self) -> StorageResult<()> {
        self.core
            .backend
            .delete_blob(&self.core.container, &self.core.name)
            .await?;
        Ok(())
    }
}

impl fmt::Debug for BlockBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockBlob")
            .field("container", &self.core.container)
            .field("name", &self.core.name)
            .field("etag", &self.core.etag)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// DataBlockBlob
// ---------------------------------------------------------------------------

/// Handle to a structured blob: a JSON document enforced by the container's
/// bound schema, with an optional in-memory mirror of the last-known
/// committed content.
///
/// The cached document and the recorded ETag always move together: whenever
/// the cache holds a document, the ETag is the one that document was last
/// confirmed current under (a load or a successful update). A document that
/// fails validation never becomes cached state.
pub struct DataBlockBlob {
    core: BlobCore,
    registry: Arc<SchemaRegistry>,
    cache_enabled: bool,
    content: Option<Value>,
}

impl DataBlockBlob {
    pub(crate) fn new(
        backend: Arc<dyn BlobBackend>,
        registry: Arc<SchemaRegistry>,
        container: &str,
        name: &str,
        cache_enabled: bool,
    ) -> Self {
        Self {
            core: BlobCore {
                backend,
                container: container.to_string(),
                name: name.to_string(),
                etag: None,
            },
            registry,
            cache_enabled,
            content: None,
        }
    }

    /// Record a confirmed (document, ETag) pair.
    ///
    /// Cache and ETag are updated in one step so a caller never observes
    /// one ahead of the other.
    pub(crate) fn record(&mut self, document: &Value, etag: ETag) {
        if self.cache_enabled {
            self.content = Some(document.clone());
        }
        self.core.etag = Some(etag);
    }

    /// Blob name, unique within its container.
    pub fn name(&self) -> &str {
        &self.core.name
    }

    /// Name of the owning container.
    pub fn container_name(&self) -> &str {
        &self.core.container
    }

    /// ETag recorded by the most recent create, load, or update through
    /// this handle.
    pub fn etag(&self) -> Option<&ETag> {
        self.core.etag.as_ref()
    }

    /// The cached document, when content caching is enabled and a load or
    /// update has confirmed one.
    pub fn content(&self) -> Option<&Value> {
        self.content.as_ref()
    }

    /// Fetch and decode the blob's current document, refreshing the cache
    /// and recorded ETag.
    ///
    /// Load trusts previously committed state: the document was validated
    /// when it was written, so it is not re-validated here.
    pub async fn load(&mut self) -> StorageResult<Value> {
        let (bytes, etag) = self
            .core
            .backend
            .read_blob(&self.core.container, &self.core.name)
            .await?;
        let document = decode_document(&bytes)?;
        debug!(container = %self.core.container, blob = %self.core.name, %etag, "loaded document");
        self.record(&document, etag);
        Ok(document)
    }

    /// Apply a transformation to the document under optimistic concurrency
    /// control and return the committed result.
    ///
    /// The modifier receives the current document and returns the desired
    /// one. It may be invoked once per attempt when conditional writes
    /// conflict, so it must be pure: no I/O, no side effects, expressed
    /// relative to the document it receives rather than as a fixed delta.
    ///
    /// On a validation failure no write is attempted and the blob's
    /// committed remote state and cache are left unchanged.
    pub async fn update<F>(&mut self, options: UpdateOptions, modifier: F) -> StorageResult<Value>
    where
        F: Fn(Value) -> Value,
    {
        let seed = if self.cache_enabled {
            self.content.clone().zip(self.core.etag.clone())
        } else {
            None
        };
        let engine = UpdateEngine {
            backend: &*self.core.backend,
            registry: &self.registry,
            container: &self.core.container,
            blob: &self.core.name,
        };
        let (document, etag) = engine.run(&options, seed, modifier).await?;
        self.record(&document, etag);
        Ok(document)
    }

    /// Remove the blob. Fails with `BlobNotFound` if already absent.
    pub async fn delete(self) -> StorageResult<()> {
        self.core
            .backend
            .delete_blob(&self.core.container, &self.core.name)
            .await?;
        Ok(())
    }
}

impl fmt::Debug for DataBlockBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataBlockBlob")
            .field("container", &self.core.container)
            .field("name", &self.core.name)
            .field("etag", &self.core.etag)
            .field("cache_enabled", &self.cache_enabled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use silo_backend::InMemoryBackend;
    use std::sync::Arc;

    use super::*;
    use crate::container::{Container, DataBlobOptions};
    use crate::storage::{BlobStorage, ContainerOptions};

    async fn plain_container(name: &str) -> (BlobStorage, Container) {
        let storage = BlobStorage::new(Arc::new(InMemoryBackend::new()));
        let container = storage
            .create_container(ContainerOptions::new(name))
            .await
            .unwrap();
        (storage, container)
    }

    // ---- BlockBlob ----

    #[tokio::test]
    async fn block_blob_load_refreshes_etag() {
        let (_storage, container) = plain_container("raw").await;
        let mut blob = container.create_block_blob("b", b"bytes").await.unwrap();
        let created = blob.etag().cloned().unwrap();

        let bytes = blob.load().await.unwrap();
        assert_eq!(bytes, b"bytes");
        assert_eq!(blob.etag().cloned().unwrap(), created);
    }

    #[tokio::test]
    async fn block_blob_delete_removes_remote_state() {
        let (_storage, container) = plain_container("raw").await;
        let blob = container.create_block_blob("b", b"bytes").await.unwrap();
        blob.delete().await.unwrap();

        let err = container.get_blob("b").await.unwrap_err();
        assert!(matches!(err, StorageError::BlobNotFound { .. }));
    }

    #[tokio::test]
    async fn delete_missing_blob_fails() {
        let (_storage, container) = plain_container("raw").await;
        let blob = container.create_block_blob("b", b"bytes").await.unwrap();
        container.get_blob("b").await.unwrap().delete().await.unwrap();

        // The second handle now points at nothing.
        let err = blob.delete().await.unwrap_err();
        assert!(matches!(err, StorageError::BlobNotFound { .. }));
    }

    // ---- DataBlockBlob cache coherence ----

    #[tokio::test]
    async fn cached_handle_tracks_load_and_update_together() {
        let (_storage, container) = plain_container("docs").await;
        let mut blob = container
            .create_data_blob(DataBlobOptions::cached("b"), json!({ "value": 24 }))
            .await
            .unwrap();

        // Creation seeds cache and ETag together.
        assert_eq!(blob.content(), Some(&json!({ "value": 24 })));
        let e0 = blob.etag().cloned().unwrap();

        // A load refreshes both.
        let loaded = blob.load().await.unwrap();
        assert_eq!(blob.content(), Some(&loaded));
        assert_eq!(blob.etag().cloned().unwrap(), e0);

        // An update moves both to the committed state.
        let committed = blob
            .update(UpdateOptions::default(), |mut doc| {
                doc["value"] = json!(40);
                doc
            })
            .await
            .unwrap();
        assert_eq!(blob.content(), Some(&committed));
        let e1 = blob.etag().cloned().unwrap();
        assert_ne!(e0, e1);

        // The recorded ETag is the one the remote holds for that content.
        let mut fresh = container
            .get_data_blob(DataBlobOptions::cached("b"))
            .await
            .unwrap();
        fresh.load().await.unwrap();
        assert_eq!(fresh.etag().cloned().unwrap(), e1);
    }

    #[tokio::test]
    async fn uncached_handle_records_etag_but_no_content() {
        let (_storage, container) = plain_container("docs").await;
        let mut blob = container
            .create_data_blob(DataBlobOptions::new("b"), json!({ "value": 1 }))
            .await
            .unwrap();

        assert!(blob.content().is_none());
        assert!(blob.etag().is_some());

        blob.load().await.unwrap();
        assert!(blob.content().is_none());
        assert!(blob.etag().is_some());
    }

    #[tokio::test]
    async fn handles_do_not_share_caches() {
        let (_storage, container) = plain_container("docs").await;
        let mut a = container
            .create_data_blob(DataBlobOptions::cached("b"), json!({ "value": 1 }))
            .await
            .unwrap();
        let mut b = container
            .get_data_blob(DataBlobOptions::cached("b"))
            .await
            .unwrap();

        b.update(UpdateOptions::default(), |mut doc| {
            doc["value"] = json!(2);
            doc
        })
        .await
        .unwrap();

        // A write through b does not implicitly refresh a's cache.
        assert_eq!(a.content(), Some(&json!({ "value": 1 })));
        // Until a loads.
        a.load().await.unwrap();
        assert_eq!(a.content(), Some(&json!({ "value": 2 })));
    }

    // ---- Decoding ----

    #[tokio::test]
    async fn undecodable_content_surfaces_as_serialization_error() {
        let (_storage, container) = plain_container("docs").await;
        container
            .create_block_blob("not-json", b"\x00\x01\x02")
            .await
            .unwrap();

        let err = container
            .get_data_blob(DataBlobOptions::new("not-json"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[tokio::test]
    async fn document_round_trips_through_canonical_encoding() {
        let (_storage, container) = plain_container("docs").await;
        let document = json!({
            "nested": { "list": [1, 2.5, "three", null, true] },
            "empty": {}
        });
        let mut blob = container
            .create_data_blob(DataBlobOptions::new("b"), document.clone())
            .await
            .unwrap();
        assert_eq!(blob.load().await.unwrap(), document);
    }
}
