//! Foundation types for Silo.
//!
//! This crate provides the types shared by every Silo crate: the opaque
//! version token assigned by the storage backend, and validation for the
//! names that identify containers and blobs.
//!
//! # Key Types
//!
//! - [`ETag`] — Opaque version token; equality is the only defined operation
//! - [`NameError`] — Structured rejection of invalid container/blob names

pub mod error;
pub mod etag;
pub mod names;

pub use error::NameError;
pub use etag::ETag;
pub use names::{validate_blob_name, validate_container_name};
