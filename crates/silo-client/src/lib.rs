//! Silo core: schema-validated object storage with optimistic concurrency.
//!
//! Callers treat JSON documents as durable objects whose structure is
//! enforced at write time and whose concurrent updates are made safe
//! without distributed locks. Every structured write funnels through the
//! container's bound schema; every mutation of existing content goes
//! through an ETag-guarded conditional write that detects concurrent
//! writers and replays the caller's transformation against the winner's
//! committed state.
//!
//! # Key Types
//!
//! - [`BlobStorage`] — account-level entry point: container lifecycle
//! - [`Container`] — namespace of blobs; owns the schema binding
//! - [`BlockBlob`] / [`DataBlockBlob`] — raw and structured blob handles
//! - [`UpdateOptions`] — retry budget and backoff for the update protocol
//! - [`StorageError`] — closed error taxonomy; branch on kinds, not strings
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use serde_json::json;
//! use silo_backend::InMemoryBackend;
//! use silo_client::{BlobStorage, ContainerOptions, DataBlobOptions, UpdateOptions};
//!
//! # async fn demo() -> silo_client::StorageResult<()> {
//! let storage = BlobStorage::new(Arc::new(InMemoryBackend::new()));
//! let container = storage
//!     .create_container(ContainerOptions::new("metrics").with_schema(json!({
//!         "type": "object",
//!         "properties": { "value": { "type": "integer" } },
//!         "additionalProperties": false,
//!         "required": ["value"]
//!     })))
//!     .await?;
//!
//! let mut blob = container
//!     .create_data_blob(DataBlobOptions::cached("worker-7"), json!({ "value": 24 }))
//!     .await?;
//!
//! // The modifier may be replayed against fresher state if another writer
//! // commits first, so it must be pure and relative to what it receives.
//! blob.update(UpdateOptions::default(), |mut doc| {
//!     doc["value"] = json!(40);
//!     doc
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```

pub mod blob;
pub mod container;
pub mod error;
pub mod storage;
pub mod update;

pub use blob::{BlockBlob, DataBlockBlob};
pub use container::{Container, DataBlobOptions, ListOptions};
pub use error::{StorageError, StorageResult};
pub use storage::{BlobStorage, ContainerOptions};
pub use update::{UpdateOptions, DEFAULT_MAX_ATTEMPTS};

// Re-exported for ergonomic matching on results.
pub use silo_schema::Violation;
pub use silo_types::ETag;
