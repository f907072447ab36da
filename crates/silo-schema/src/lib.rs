//! Schema validation for Silo.
//!
//! A container may be created with an attached schema: a structural JSON
//! contract every document in that container must satisfy, both at creation
//! and at every update. This crate provides the validator capability and the
//! registry that binds containers to their schemas.
//!
//! # Key Types
//!
//! - [`Schema`] — a compiled structural contract; `validate` returns the
//!   list of violations (empty means valid)
//! - [`Violation`] — a single failed constraint: instance path + message
//! - [`SchemaRegistry`] — container name → schema binding; a container with
//!   no binding treats every document as valid
//!
//! Validation is pure: no I/O, no side effects beyond registry lookup.
//!
//! # Supported Keywords
//!
//! The validator covers the structural subset used by container contracts:
//! `type`, `properties`, `required`, `additionalProperties`, `items`, and
//! `enum`. Unknown keywords are rejected at compile time rather than
//! silently ignored.

pub mod error;
pub mod registry;
pub mod schema;

pub use error::SchemaError;
pub use registry::{SchemaRef, SchemaRegistry};
pub use schema::{Schema, Violation};
