//! Storage backend capability for Silo.
//!
//! The backend is an opaque collaborator: a named-blob store with
//! containers, ETags, and conditional writes. This crate defines the
//! capability surface the rest of Silo consumes and ships one reference
//! implementation.
//!
//! # Storage Backends
//!
//! All backends implement the [`BlobBackend`] trait:
//!
//! - [`InMemoryBackend`] — `HashMap`-based backend for tests and embedding
//!
//! # Design Rules
//!
//! 1. Every successful write assigns a fresh, opaque ETag.
//! 2. `write_blob_if_match` is the only mutation of existing content, and
//!    it commits only when the expected ETag still matches — this is the
//!    linearization point for concurrent writers.
//! 3. The backend never interprets blob contents.
//! 4. Every failure maps to a closed [`BackendError`] kind; callers branch
//!    on variants, never on message strings.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{BackendError, BackendResult};
pub use memory::InMemoryBackend;
pub use traits::{BlobBackend, BlobEntry};
