//! The optimistic-concurrency update protocol.
//!
//! An update never holds a lock on remote state. Each attempt loads the
//! current document and its ETag, applies the caller's transformation,
//! validates the result, and submits a conditional write guarded by the
//! ETag it started from. The backend rejects the write if another writer
//! committed in between; the engine then reloads and replays the
//! transformation against the winner's state, up to a bounded number of
//! attempts.
//!
//! The conditional write is the sole linearization point: across any number
//! of contenders, exactly one can commit against a given starting ETag, so
//! no update is ever silently lost.

use std::time::Duration;

use serde_json::Value;
use silo_backend::{BackendError, BlobBackend};
use silo_schema::SchemaRegistry;
use silo_types::ETag;
use tracing::debug;

use crate::blob::{decode_document, encode_document};
use crate::error::{StorageError, StorageResult};

/// Default number of load→transform→validate→write attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;

/// Options governing an [`update`](crate::DataBlockBlob::update) call.
#[derive(Clone, Debug)]
pub struct UpdateOptions {
    /// Maximum attempts before the update fails with
    /// [`ConcurrentUpdate`](crate::StorageError::ConcurrentUpdate).
    /// Values below 1 are treated as 1.
    pub max_attempts: u32,
    /// Base delay between conflict retries, jittered uniformly in
    /// [0.5, 1.5) of this value. `None` retries immediately.
    pub backoff: Option<Duration>,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: None,
        }
    }
}

impl UpdateOptions {
    /// Options with a custom retry budget and no backoff.
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Default::default()
        }
    }
}

fn jittered(base: Duration) -> Duration {
    base.mul_f64(0.5 + rand::random::<f64>())
}

/// One update call's worth of protocol state.
pub(crate) struct UpdateEngine<'a> {
    pub backend: &'a dyn BlobBackend,
    pub registry: &'a SchemaRegistry,
    pub container: &'a str,
    pub blob: &'a str,
}

impl UpdateEngine<'_> {
    /// Drive the protocol to a terminal state.
    ///
    /// `seed` is the handle's cached document and the ETag it was confirmed
    /// current under; it serves the first attempt in place of a fresh read.
    /// Retries always reload. The modifier may be invoked once per attempt
    /// and must be pure.
    ///
    /// Returns the committed document and its new ETag.
    pub async fn run<F>(
        &self,
        options: &UpdateOptions,
        mut seed: Option<(Value, ETag)>,
        modifier: F,
    ) -> StorageResult<(Value, ETag)>
    where
        F: Fn(Value) -> Value,
    {
        let max_attempts = options.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            // Load: cached state for the first attempt, fresh read after.
            let (current, expected) = match seed.take() {
                Some(cached) => cached,
                None => {
                    let (bytes, etag) = self.backend.read_blob(self.container, self.blob).await?;
                    (decode_document(&bytes)?, etag)
                }
            };

            // Transform, then validate before any write: an invalid
            // document must never reach the backend.
            let transformed = modifier(current);
            self.registry.validate(self.container, &transformed)?;

            let bytes = encode_document(&transformed)?;
            match self
                .backend
                .write_blob_if_match(self.container, self.blob, &bytes, &expected)
                .await
            {
                Ok(etag) => {
                    debug!(container = self.container, blob = self.blob, %etag, attempt,
                        "update committed");
                    return Ok((transformed, etag));
                }
                Err(BackendError::PreconditionFailed { .. }) => {
                    debug!(container = self.container, blob = self.blob, attempt,
                        "conditional write conflicted, replaying against fresh state");
                    if attempt < max_attempts {
                        if let Some(base) = options.backoff {
                            tokio::time::sleep(jittered(base)).await;
                        }
                    }
                }
                Err(other) => return Err(other.into()),
            }
        }

        Err(StorageError::ConcurrentUpdate {
            name: self.blob.to_string(),
            attempts: max_attempts,
        })
    }
}
