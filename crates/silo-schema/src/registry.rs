//! Container → schema bindings.
//!
//! [`SchemaRegistry`] associates a container name with the compiled
//! [`Schema`] every structured blob in that container must satisfy. The
//! binding is established when the container is created and removed when
//! the container is deleted; a container with no binding treats every
//! document as valid.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use serde_json::Value;

use crate::error::SchemaError;
use crate::schema::Schema;

/// Stable URI-like reference to a container's bound schema.
///
/// The reference is derived from the container name and is what the backend
/// persists alongside the container record, so the binding survives as a
/// field of the container entity rather than process state.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SchemaRef(String);

impl SchemaRef {
    /// The canonical schema reference for a container.
    pub fn for_container(container: &str) -> Self {
        Self(format!("silo:schema/{container}#"))
    }

    /// The reference as a string, suitable for persistence.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SchemaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registry of container schema bindings.
///
/// All lookups go through an `RwLock`; validation itself is pure and holds
/// the lock only long enough to clone the `Arc` to the compiled schema.
#[derive(Default)]
pub struct SchemaRegistry {
    schemas: RwLock<HashMap<String, Arc<Schema>>>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            schemas: RwLock::new(HashMap::new()),
        }
    }

    /// Bind a compiled schema to a container, returning its stable reference.
    ///
    /// Rebinding a name replaces the previous binding (the container create
    /// path only binds after the backend has accepted the container, so a
    /// stale binding can only be left behind by a failed delete).
    pub fn bind(&self, container: &str, schema: Schema) -> SchemaRef {
        let mut schemas = self.schemas.write().expect("lock poisoned");
        schemas.insert(container.to_string(), Arc::new(schema));
        SchemaRef::for_container(container)
    }

    /// Remove a container's binding. Returns `true` if a binding existed.
    pub fn unbind(&self, container: &str) -> bool {
        let mut schemas = self.schemas.write().expect("lock poisoned");
        schemas.remove(container).is_some()
    }

    /// Whether the container has a bound schema.
    pub fn is_bound(&self, container: &str) -> bool {
        let schemas = self.schemas.read().expect("lock poisoned");
        schemas.contains_key(container)
    }

    /// The compiled schema bound to a container, if any.
    pub fn schema(&self, container: &str) -> Option<Arc<Schema>> {
        let schemas = self.schemas.read().expect("lock poisoned");
        schemas.get(container).cloned()
    }

    /// Validate a document against the container's bound schema.
    ///
    /// A container with no binding accepts every document. Validation never
    /// mutates registry state.
    pub fn validate(&self, container: &str, document: &Value) -> Result<(), SchemaError> {
        let Some(schema) = self.schema(container) else {
            return Ok(());
        };
        let violations = schema.validate(document);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::Validation { violations })
        }
    }
}

impl fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.schemas.read().expect("lock poisoned").len();
        f.debug_struct("SchemaRegistry")
            .field("bound_containers", &count)
            .finish()
    }
}
