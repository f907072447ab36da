//! Containers: namespaces of blobs with an optional bound schema.
//!
//! A container funnels every structured write through validation: a
//! document that fails the bound schema never reaches the backend, at
//! creation or at any later update.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use silo_backend::BlobBackend;
use silo_schema::{SchemaRef, SchemaRegistry};
use silo_types::validate_blob_name;
use tracing::debug;

use crate::blob::{decode_document, encode_document, BlockBlob, DataBlockBlob};
use crate::error::StorageResult;

/// Options for creating or opening a structured blob.
#[derive(Clone, Debug)]
pub struct DataBlobOptions {
    /// Blob name, unique within the container.
    pub name: String,
    /// Keep an in-memory mirror of the last-known committed document on
    /// the returned handle.
    pub cache_content: bool,
}

impl DataBlobOptions {
    /// Options for a handle without content caching.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cache_content: false,
        }
    }

    /// Options for a handle that caches content.
    pub fn cached(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cache_content: true,
        }
    }
}

/// Options for listing blobs.
#[derive(Clone, Debug, Default)]
pub struct ListOptions {
    /// Only blobs whose name starts with this prefix. `None` lists all.
    pub prefix: Option<String>,
}

impl ListOptions {
    /// List only blobs whose name starts with `prefix`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }
}

/// A namespace of blobs, with an optional schema every structured document
/// must satisfy.
///
/// Obtained from [`BlobStorage::create_container`](crate::BlobStorage::create_container).
/// The schema binding is fixed at creation; the container never re-validates
/// on load because only validated documents are ever committed.
pub struct Container {
    backend: Arc<dyn BlobBackend>,
    registry: Arc<SchemaRegistry>,
    name: String,
    schema_ref: Option<SchemaRef>,
}

impl Container {
    pub(crate) fn new(
        backend: Arc<dyn BlobBackend>,
        registry: Arc<SchemaRegistry>,
        name: String,
        schema_ref: Option<SchemaRef>,
    ) -> Self {
        Self {
            backend,
            registry,
            name,
            schema_ref,
        }
    }

    /// Container name, unique within the storage account.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stable reference to the bound schema, if one was attached.
    pub fn schema_ref(&self) -> Option<&SchemaRef> {
        self.schema_ref.as_ref()
    }

    /// Create a raw blob from bytes. No validation applies.
    ///
    /// Fails with `BlobExists` if the name is taken.
    pub async fn create_block_blob(&self, name: &str, bytes: &[u8]) -> StorageResult<BlockBlob> {
        validate_blob_name(name)?;
        let etag = self.backend.create_blob(&self.name, name, bytes).await?;
        Ok(BlockBlob::new(
            Arc::clone(&self.backend),
            &self.name,
            name,
            Some(etag),
        ))
    }

    /// Create a structured blob from a document.
    ///
    /// The document is validated against the bound schema before anything
    /// is written: on violation the call fails with `SchemaValidation` and
    /// the backend is left untouched. On success the document is written in
    /// its canonical encoding and the returned handle carries the fresh
    /// ETag — and the document itself as cache, when
    /// [`DataBlobOptions::cache_content`] is set.
    pub async fn create_data_blob(
        &self,
        options: DataBlobOptions,
        document: Value,
    ) -> StorageResult<DataBlockBlob> {
        validate_blob_name(&options.name)?;
        self.registry.validate(&self.name, &document)?;

        let bytes = encode_document(&document)?;
        let etag = self
            .backend
            .create_blob(&self.name, &options.name, &bytes)
            .await?;
        debug!(container = %self.name, blob = %options.name, %etag, "created data blob");

        let mut blob = DataBlockBlob::new(
            Arc::clone(&self.backend),
            Arc::clone(&self.registry),
            &self.name,
            &options.name,
            options.cache_content,
        );
        blob.record(&document, etag);
        Ok(blob)
    }

    /// Handle to an existing blob, existence-checked.
    ///
    /// Fails with `BlobNotFound` if absent. The handle carries the blob's
    /// current ETag; content is not retained.
    pub async fn get_blob(&self, name: &str) -> StorageResult<BlockBlob> {
        validate_blob_name(name)?;
        let (_bytes, etag) = self.backend.read_blob(&self.name, name).await?;
        Ok(BlockBlob::new(
            Arc::clone(&self.backend),
            &self.name,
            name,
            Some(etag),
        ))
    }

    /// Handle to an existing structured blob.
    ///
    /// Reads and decodes the current document to confirm the blob exists
    /// and is structured; the handle caches it iff
    /// [`DataBlobOptions::cache_content`] is set.
    pub async fn get_data_blob(&self, options: DataBlobOptions) -> StorageResult<DataBlockBlob> {
        validate_blob_name(&options.name)?;
        let (bytes, etag) = self.backend.read_blob(&self.name, &options.name).await?;
        let document = decode_document(&bytes)?;

        let mut blob = DataBlockBlob::new(
            Arc::clone(&self.backend),
            Arc::clone(&self.registry),
            &self.name,
            &options.name,
            options.cache_content,
        );
        blob.record(&document, etag);
        Ok(blob)
    }

    /// List blob handles by name prefix, sorted by name.
    ///
    /// Handles carry name and current ETag only; content is not loaded.
    /// Re-issuing the same call with no intervening writes returns the
    /// same listing.
    pub async fn list_blobs(&self, options: ListOptions) -> StorageResult<Vec<BlockBlob>> {
        let prefix = options.prefix.unwrap_or_default();
        let entries = self.backend.list_blobs(&self.name, &prefix).await?;
        Ok(entries
            .into_iter()
            .map(|entry| {
                BlockBlob::new(
                    Arc::clone(&self.backend),
                    &self.name,
                    &entry.name,
                    Some(entry.etag),
                )
            })
            .collect())
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("name", &self.name)
            .field("schema_ref", &self.schema_ref)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use silo_backend::InMemoryBackend;
    use std::sync::Arc;

    use super::*;
    use crate::error::StorageError;
    use crate::storage::{BlobStorage, ContainerOptions};

    fn value_schema() -> Value {
        json!({
            "type": "object",
            "properties": { "value": { "type": "integer" } },
            "additionalProperties": false,
            "required": ["value"]
        })
    }

    async fn schema_container(name: &str) -> (Arc<InMemoryBackend>, BlobStorage, Container) {
        let backend = Arc::new(InMemoryBackend::new());
        let storage = BlobStorage::new(Arc::clone(&backend));
        let container = storage
            .create_container(ContainerOptions::new(name).with_schema(value_schema()))
            .await
            .unwrap();
        (backend, storage, container)
    }

    // ---- create / list / load round trip ----

    #[tokio::test]
    async fn create_list_and_load_a_data_blob() {
        let (_backend, _storage, container) = schema_container("round-trip").await;
        let mut blob = container
            .create_data_blob(DataBlobOptions::new("b1"), json!({ "value": 40 }))
            .await
            .unwrap();

        let listing = container
            .list_blobs(ListOptions::with_prefix("b1"))
            .await
            .unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].name(), "b1");
        assert!(listing[0].etag().is_some());

        let data = blob.load().await.unwrap();
        assert_eq!(data, json!({ "value": 40 }));
    }

    // ---- validation gating ----

    #[tokio::test]
    async fn invalid_document_is_rejected_without_a_write() {
        let (backend, _storage, container) = schema_container("gated").await;

        let err = container
            .create_data_blob(DataBlobOptions::new("b2"), json!({ "value": "wrong value" }))
            .await
            .unwrap_err();
        match err {
            StorageError::SchemaValidation { violations } => {
                assert_eq!(violations.len(), 1);
                assert_eq!(violations[0].path, "/value");
            }
            other => panic!("unexpected error: {other}"),
        }

        // The backend was never touched: the blob does not exist.
        assert_eq!(backend.blob_count("gated"), Some(0));
        let listing = container.list_blobs(ListOptions::default()).await.unwrap();
        assert!(listing.is_empty());
    }

    #[tokio::test]
    async fn container_without_schema_accepts_any_document() {
        let storage = BlobStorage::new(Arc::new(InMemoryBackend::new()));
        let container = storage
            .create_container(ContainerOptions::new("lax"))
            .await
            .unwrap();
        container
            .create_data_blob(DataBlobOptions::new("anything"), json!({ "free": "form" }))
            .await
            .unwrap();
    }

    // ---- identity errors ----

    #[tokio::test]
    async fn duplicate_blob_name_is_rejected() {
        let (_backend, _storage, container) = schema_container("dups").await;
        container
            .create_data_blob(DataBlobOptions::new("b"), json!({ "value": 1 }))
            .await
            .unwrap();

        let err = container
            .create_data_blob(DataBlobOptions::new("b"), json!({ "value": 2 }))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::BlobExists { .. }));
    }

    #[tokio::test]
    async fn get_blob_checks_existence() {
        let (_backend, _storage, container) = schema_container("lookups").await;
        let err = container.get_blob("ghost").await.unwrap_err();
        assert!(matches!(err, StorageError::BlobNotFound { .. }));

        container
            .create_data_blob(DataBlobOptions::new("real"), json!({ "value": 1 }))
            .await
            .unwrap();
        let blob = container.get_blob("real").await.unwrap();
        assert_eq!(blob.name(), "real");
        assert!(blob.etag().is_some());
    }

    #[tokio::test]
    async fn invalid_blob_names_fail_before_the_backend() {
        let (backend, _storage, container) = schema_container("named").await;
        let err = container
            .create_data_blob(DataBlobOptions::new(""), json!({ "value": 1 }))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidName { .. }));
        assert_eq!(backend.blob_count("named"), Some(0));
    }

    // ---- cache seeding ----

    #[tokio::test]
    async fn cached_create_seeds_content_and_etag() {
        let (_backend, _storage, container) = schema_container("cached").await;
        let blob = container
            .create_data_blob(DataBlobOptions::cached("b"), json!({ "value": 24 }))
            .await
            .unwrap();
        assert_eq!(blob.content(), Some(&json!({ "value": 24 })));
        assert!(blob.etag().is_some());
    }

    #[tokio::test]
    async fn get_data_blob_caches_only_when_asked() {
        let (_backend, _storage, container) = schema_container("cached").await;
        container
            .create_data_blob(DataBlobOptions::new("b"), json!({ "value": 7 }))
            .await
            .unwrap();

        let plain = container
            .get_data_blob(DataBlobOptions::new("b"))
            .await
            .unwrap();
        assert!(plain.content().is_none());
        assert!(plain.etag().is_some());

        let cached = container
            .get_data_blob(DataBlobOptions::cached("b"))
            .await
            .unwrap();
        assert_eq!(cached.content(), Some(&json!({ "value": 7 })));
    }

    // ---- listing semantics ----

    #[tokio::test]
    async fn listing_is_prefix_exact_and_order_independent() {
        let (_backend, _storage, container) = schema_container("listed").await;
        for name in ["state/b", "other", "state/a"] {
            container
                .create_data_blob(DataBlobOptions::new(name), json!({ "value": 1 }))
                .await
                .unwrap();
        }

        let state = container
            .list_blobs(ListOptions::with_prefix("state/"))
            .await
            .unwrap();
        assert_eq!(
            state.iter().map(BlockBlob::name).collect::<Vec<_>>(),
            vec!["state/a", "state/b"]
        );

        let all = container.list_blobs(ListOptions::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        // Idempotent without intervening writes.
        let again = container.list_blobs(ListOptions::default()).await.unwrap();
        assert_eq!(
            all.iter().map(BlockBlob::name).collect::<Vec<_>>(),
            again.iter().map(BlockBlob::name).collect::<Vec<_>>()
        );
    }
}
