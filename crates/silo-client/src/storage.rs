//! The account-level entry point: container lifecycle.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use silo_backend::BlobBackend;
use silo_schema::{Schema, SchemaRef, SchemaRegistry};
use silo_types::validate_container_name;
use tracing::info;

use crate::container::Container;
use crate::error::StorageResult;

/// Options for creating a container.
#[derive(Clone, Debug)]
pub struct ContainerOptions {
    /// Container name, unique within the storage account.
    pub name: String,
    /// Schema document every structured blob in the container must
    /// satisfy. `None` leaves the container unvalidated.
    pub schema: Option<Value>,
}

impl ContainerOptions {
    /// Options for a container without a schema.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
        }
    }

    /// Attach a schema document.
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }
}

/// Handle to a storage account: the root object from which containers are
/// created and deleted.
///
/// Owns the backend capability and the schema registry shared by every
/// container it hands out. Cloning is cheap; clones share both.
#[derive(Clone)]
pub struct BlobStorage {
    backend: Arc<dyn BlobBackend>,
    registry: Arc<SchemaRegistry>,
}

impl BlobStorage {
    /// Wrap a backend capability.
    pub fn new(backend: Arc<dyn BlobBackend>) -> Self {
        Self {
            backend,
            registry: Arc::new(SchemaRegistry::new()),
        }
    }

    /// Create a container, optionally binding a schema.
    ///
    /// The schema document is compiled before any backend call, so a
    /// malformed schema fails with `InvalidSchema` and leaves nothing
    /// behind. The schema reference is persisted by the backend alongside
    /// the container entity. Fails with `ContainerExists` if the name is
    /// taken.
    pub async fn create_container(&self, options: ContainerOptions) -> StorageResult<Container> {
        validate_container_name(&options.name)?;

        let schema = options.schema.map(Schema::new).transpose()?;
        let schema_ref = schema
            .as_ref()
            .map(|_| SchemaRef::for_container(&options.name));

        self.backend
            .create_container(&options.name, schema_ref.as_ref().map(SchemaRef::as_str))
            .await?;

        // Bind only after the backend accepted the container, so a failed
        // create leaves no stray binding.
        if let Some(schema) = schema {
            self.registry.bind(&options.name, schema);
        }
        info!(container = %options.name, schema = schema_ref.is_some(), "created container");

        Ok(Container::new(
            Arc::clone(&self.backend),
            Arc::clone(&self.registry),
            options.name,
            schema_ref,
        ))
    }

    /// Delete a container and all blobs it holds, dropping its schema
    /// binding. Fails with `ContainerNotFound` if absent.
    pub async fn delete_container(&self, name: &str) -> StorageResult<()> {
        self.backend.delete_container(name).await?;
        self.registry.unbind(name);
        info!(container = name, "deleted container");
        Ok(())
    }
}

impl fmt::Debug for BlobStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobStorage").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use silo_backend::InMemoryBackend;
    use std::sync::Arc;

    use super::*;
    use crate::container::DataBlobOptions;
    use crate::error::StorageError;

    fn value_schema() -> Value {
        json!({
            "type": "object",
            "properties": { "value": { "type": "integer" } },
            "additionalProperties": false,
            "required": ["value"]
        })
    }

    #[tokio::test]
    async fn create_container_with_schema_persists_the_ref() {
        let backend = Arc::new(InMemoryBackend::new());
        let storage = BlobStorage::new(Arc::clone(&backend));

        let container = storage
            .create_container(ContainerOptions::new("metrics").with_schema(value_schema()))
            .await
            .unwrap();

        assert_eq!(container.name(), "metrics");
        assert_eq!(
            container.schema_ref().map(SchemaRef::as_str),
            Some("silo:schema/metrics#")
        );
        // The binding is a persisted field of the container entity.
        assert_eq!(
            backend.schema_ref("metrics").as_deref(),
            Some("silo:schema/metrics#")
        );
    }

    #[tokio::test]
    async fn create_container_without_schema() {
        let backend = Arc::new(InMemoryBackend::new());
        let storage = BlobStorage::new(Arc::clone(&backend));

        let container = storage
            .create_container(ContainerOptions::new("plain"))
            .await
            .unwrap();
        assert!(container.schema_ref().is_none());
        assert_eq!(backend.schema_ref("plain"), None);
    }

    #[tokio::test]
    async fn duplicate_container_fails() {
        let storage = BlobStorage::new(Arc::new(InMemoryBackend::new()));
        storage
            .create_container(ContainerOptions::new("taken"))
            .await
            .unwrap();

        let err = storage
            .create_container(ContainerOptions::new("taken"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::ContainerExists { .. }));
    }

    #[tokio::test]
    async fn invalid_container_name_fails_before_the_backend() {
        let backend = Arc::new(InMemoryBackend::new());
        let storage = BlobStorage::new(Arc::clone(&backend));

        let err = storage
            .create_container(ContainerOptions::new("Bad Name"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidName { .. }));
        assert_eq!(backend.container_count(), 0);
    }

    #[tokio::test]
    async fn malformed_schema_fails_before_the_backend() {
        let backend = Arc::new(InMemoryBackend::new());
        let storage = BlobStorage::new(Arc::clone(&backend));

        let err = storage
            .create_container(
                ContainerOptions::new("broken").with_schema(json!({ "type": "decimal" })),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidSchema { .. }));
        assert_eq!(backend.container_count(), 0);
    }

    #[tokio::test]
    async fn delete_container_drops_the_schema_binding() {
        let storage = BlobStorage::new(Arc::new(InMemoryBackend::new()));
        let container = storage
            .create_container(ContainerOptions::new("temp").with_schema(value_schema()))
            .await
            .unwrap();

        // Enforced while bound.
        assert!(container
            .create_data_blob(DataBlobOptions::new("b"), json!({ "value": "bad" }))
            .await
            .is_err());

        storage.delete_container("temp").await.unwrap();

        // Recreated without a schema: the old binding must not linger.
        let recreated = storage
            .create_container(ContainerOptions::new("temp"))
            .await
            .unwrap();
        recreated
            .create_data_blob(DataBlobOptions::new("b"), json!({ "value": "bad" }))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn delete_missing_container_fails() {
        let storage = BlobStorage::new(Arc::new(InMemoryBackend::new()));
        let err = storage.delete_container("ghost").await.unwrap_err();
        assert!(matches!(err, StorageError::ContainerNotFound { .. }));
    }
}
