//! In-memory backend for testing and ephemeral use.
//!
//! [`InMemoryBackend`] keeps all containers and blobs in a `HashMap`
//! protected by a `RwLock`. It implements the full [`BlobBackend`] trait
//! with the same if-match semantics a remote object store provides, and is
//! suitable for unit tests, examples, and short-lived processes.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use silo_types::ETag;
use tracing::debug;
use uuid::Uuid;

use crate::error::{BackendError, BackendResult};
use crate::traits::{BlobBackend, BlobEntry};

#[derive(Clone, Debug)]
struct BlobRecord {
    bytes: Vec<u8>,
    etag: ETag,
}

#[derive(Debug, Default)]
struct ContainerRecord {
    schema_ref: Option<String>,
    blobs: HashMap<String, BlobRecord>,
}

/// An in-memory implementation of [`BlobBackend`].
///
/// All data lives behind a `RwLock` and is lost when the backend is
/// dropped. ETags are uuid-v7 tokens: fresh on every successful write,
/// never reused for the same blob.
#[derive(Default)]
pub struct InMemoryBackend {
    containers: RwLock<HashMap<String, ContainerRecord>>,
}

fn fresh_etag() -> ETag {
    ETag::new(Uuid::now_v7().to_string())
}

impl InMemoryBackend {
    /// Create a new empty backend.
    pub fn new() -> Self {
        Self {
            containers: RwLock::new(HashMap::new()),
        }
    }

    /// Number of containers currently registered.
    pub fn container_count(&self) -> usize {
        self.containers.read().expect("lock poisoned").len()
    }

    /// Number of blobs in a container, or `None` if the container is absent.
    pub fn blob_count(&self, container: &str) -> Option<usize> {
        let containers = self.containers.read().expect("lock poisoned");
        containers.get(container).map(|c| c.blobs.len())
    }

    /// The schema reference recorded for a container, if any.
    pub fn schema_ref(&self, container: &str) -> Option<String> {
        let containers = self.containers.read().expect("lock poisoned");
        containers.get(container).and_then(|c| c.schema_ref.clone())
    }
}

#[async_trait]
impl BlobBackend for InMemoryBackend {
    async fn create_container(&self, name: &str, schema_ref: Option<&str>) -> BackendResult<()> {
        let mut containers = self.containers.write().expect("lock poisoned");
        if containers.contains_key(name) {
            return Err(BackendError::ContainerExists {
                name: name.to_string(),
            });
        }
        debug!(container = name, "creating container");
        containers.insert(
            name.to_string(),
            ContainerRecord {
                schema_ref: schema_ref.map(str::to_string),
                blobs: HashMap::new(),
            },
        );
        Ok(())
    }

    async fn delete_container(&self, name: &str) -> BackendResult<()> {
        let mut containers = self.containers.write().expect("lock poisoned");
        if containers.remove(name).is_none() {
            return Err(BackendError::ContainerNotFound {
                name: name.to_string(),
            });
        }
        debug!(container = name, "deleted container");
        Ok(())
    }

    async fn create_blob(&self, container: &str, name: &str, bytes: &[u8]) -> BackendResult<ETag> {
        let mut containers = self.containers.write().expect("lock poisoned");
        let record = containers
            .get_mut(container)
            .ok_or_else(|| BackendError::ContainerNotFound {
                name: container.to_string(),
            })?;
        if record.blobs.contains_key(name) {
            return Err(BackendError::BlobExists {
                container: container.to_string(),
                name: name.to_string(),
            });
        }
        let etag = fresh_etag();
        debug!(container, blob = name, %etag, "creating blob");
        record.blobs.insert(
            name.to_string(),
            BlobRecord {
                bytes: bytes.to_vec(),
                etag: etag.clone(),
            },
        );
        Ok(etag)
    }

    async fn read_blob(&self, container: &str, name: &str) -> BackendResult<(Vec<u8>, ETag)> {
        let containers = self.containers.read().expect("lock poisoned");
        let record = containers
            .get(container)
            .ok_or_else(|| BackendError::ContainerNotFound {
                name: container.to_string(),
            })?;
        let blob = record
            .blobs
            .get(name)
            .ok_or_else(|| BackendError::BlobNotFound {
                container: container.to_string(),
                name: name.to_string(),
            })?;
        Ok((blob.bytes.clone(), blob.etag.clone()))
    }

    async fn write_blob_if_match(
        &self,
        container: &str,
        name: &str,
        bytes: &[u8],
        expected: &ETag,
    ) -> BackendResult<ETag> {
        let mut containers = self.containers.write().expect("lock poisoned");
        let record = containers
            .get_mut(container)
            .ok_or_else(|| BackendError::ContainerNotFound {
                name: container.to_string(),
            })?;
        let blob = record
            .blobs
            .get_mut(name)
            .ok_or_else(|| BackendError::BlobNotFound {
                container: container.to_string(),
                name: name.to_string(),
            })?;

        // The linearization point: the compare and the swap happen under
        // one write lock, so at most one contender wins a given ETag.
        if blob.etag != *expected {
            debug!(container, blob = name, expected = %expected, current = %blob.etag,
                "conditional write rejected");
            return Err(BackendError::PreconditionFailed {
                container: container.to_string(),
                name: name.to_string(),
            });
        }

        let etag = fresh_etag();
        debug!(container, blob = name, %etag, "conditional write committed");
        blob.bytes = bytes.to_vec();
        blob.etag = etag.clone();
        Ok(etag)
    }

    async fn delete_blob(&self, container: &str, name: &str) -> BackendResult<()> {
        let mut containers = self.containers.write().expect("lock poisoned");
        let record = containers
            .get_mut(container)
            .ok_or_else(|| BackendError::ContainerNotFound {
                name: container.to_string(),
            })?;
        if record.blobs.remove(name).is_none() {
            return Err(BackendError::BlobNotFound {
                container: container.to_string(),
                name: name.to_string(),
            });
        }
        debug!(container, blob = name, "deleted blob");
        Ok(())
    }

    async fn list_blobs(&self, container: &str, prefix: &str) -> BackendResult<Vec<BlobEntry>> {
        let containers = self.containers.read().expect("lock poisoned");
        let record = containers
            .get(container)
            .ok_or_else(|| BackendError::ContainerNotFound {
                name: container.to_string(),
            })?;
        let mut entries: Vec<BlobEntry> = record
            .blobs
            .iter()
            .filter(|(name, _)| name.starts_with(prefix))
            .map(|(name, blob)| BlobEntry {
                name: name.clone(),
                etag: blob.etag.clone(),
            })
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

impl std::fmt::Debug for InMemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBackend")
            .field("container_count", &self.container_count())
            .finish()
    }
}
