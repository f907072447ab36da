use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SchemaError;

/// Annotation keywords carried by schema documents but not enforced.
const ANNOTATION_KEYWORDS: &[&str] = &["$schema", "title", "description", "default"];

/// Type names accepted by the `type` keyword.
const TYPE_NAMES: &[&str] = &[
    "object", "array", "string", "integer", "number", "boolean", "null",
];

/// A single failed constraint: where in the document, and what went wrong.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// JSON-pointer-style path into the instance ("" is the root).
    pub path: String,
    /// Human-readable description of the failed constraint.
    pub message: String,
}

impl Violation {
    fn new(path: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// A compiled structural contract.
///
/// Compilation checks the schema document itself: unknown keywords, unknown
/// type names, and malformed keyword values are rejected up front, so a
/// container never ends up bound to a contract that cannot be enforced.
/// Once compiled, a schema is immutable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schema {
    root: Value,
}

impl Schema {
    /// Compile a schema document.
    pub fn new(document: Value) -> Result<Self, SchemaError> {
        check_schema_node(&document, "")?;
        Ok(Self { root: document })
    }

    /// The schema document this contract was compiled from.
    pub fn document(&self) -> &Value {
        &self.root
    }

    /// Validate an instance against this schema.
    ///
    /// Returns every failed constraint; an empty list means the instance is
    /// valid. Validation is pure and never fails for reasons other than the
    /// instance itself.
    pub fn validate(&self, instance: &Value) -> Vec<Violation> {
        let mut violations = Vec::new();
        validate_node(&self.root, instance, "", &mut violations);
        violations
    }
}

/// Reject malformed schema documents before they are ever bound.
fn check_schema_node(schema: &Value, path: &str) -> Result<(), SchemaError> {
    let obj = schema.as_object().ok_or_else(|| SchemaError::InvalidSchema {
        reason: format!("schema at {path:?} must be an object"),
    })?;

    for (keyword, value) in obj {
        match keyword.as_str() {
            k if ANNOTATION_KEYWORDS.contains(&k) => {}
            "type" => check_type_keyword(value, path)?,
            "properties" => {
                let props = value.as_object().ok_or_else(|| SchemaError::InvalidSchema {
                    reason: format!("'properties' at {path:?} must be an object"),
                })?;
                for (name, subschema) in props {
                    check_schema_node(subschema, &format!("{path}/{name}"))?;
                }
            }
            "required" => {
                let names = value.as_array().ok_or_else(|| SchemaError::InvalidSchema {
                    reason: format!("'required' at {path:?} must be an array"),
                })?;
                if names.iter().any(|n| !n.is_string()) {
                    return Err(SchemaError::InvalidSchema {
                        reason: format!("'required' at {path:?} must contain only strings"),
                    });
                }
            }
            "additionalProperties" => {
                if !value.is_boolean() {
                    return Err(SchemaError::InvalidSchema {
                        reason: format!("'additionalProperties' at {path:?} must be a boolean"),
                    });
                }
            }
            "items" => check_schema_node(value, &format!("{path}/items"))?,
            "enum" => {
                let options = value.as_array().ok_or_else(|| SchemaError::InvalidSchema {
                    reason: format!("'enum' at {path:?} must be an array"),
                })?;
                if options.is_empty() {
                    return Err(SchemaError::InvalidSchema {
                        reason: format!("'enum' at {path:?} must not be empty"),
                    });
                }
            }
            other => {
                return Err(SchemaError::InvalidSchema {
                    reason: format!("unsupported keyword at {path:?}: {other}"),
                })
            }
        }
    }

    Ok(())
}

fn check_type_keyword(value: &Value, path: &str) -> Result<(), SchemaError> {
    let names: Vec<&str> = match value {
        Value::String(name) => vec![name.as_str()],
        Value::Array(entries) => {
            let names: Option<Vec<&str>> = entries.iter().map(Value::as_str).collect();
            names.ok_or_else(|| SchemaError::InvalidSchema {
                reason: format!("'type' at {path:?} must be a string or array of strings"),
            })?
        }
        _ => {
            return Err(SchemaError::InvalidSchema {
                reason: format!("'type' at {path:?} must be a string or array of strings"),
            })
        }
    };
    for name in names {
        if !TYPE_NAMES.contains(&name) {
            return Err(SchemaError::InvalidSchema {
                reason: format!("unknown type name at {path:?}: {name}"),
            });
        }
    }
    Ok(())
}

fn validate_node(schema: &Value, instance: &Value, path: &str, out: &mut Vec<Violation>) {
    // Compilation guarantees every schema node is an object.
    let Some(obj) = schema.as_object() else {
        return;
    };

    if let Some(type_value) = obj.get("type") {
        if !matches_type_keyword(type_value, instance) {
            out.push(Violation::new(
                path,
                format!(
                    "expected {}, got {}",
                    describe_type_keyword(type_value),
                    type_name_of(instance)
                ),
            ));
            // A type mismatch makes the structural checks below meaningless.
            return;
        }
    }

    if let Some(options) = obj.get("enum").and_then(Value::as_array) {
        if !options.contains(instance) {
            out.push(Violation::new(path, "value is not one of the permitted values"));
        }
    }

    if let Some(instance_obj) = instance.as_object() {
        let properties = obj.get("properties").and_then(Value::as_object);

        if let Some(names) = obj.get("required").and_then(Value::as_array) {
            for name in names.iter().filter_map(Value::as_str) {
                if !instance_obj.contains_key(name) {
                    out.push(Violation::new(
                        path,
                        format!("missing required property: {name}"),
                    ));
                }
            }
        }

        if let Some(properties) = properties {
            for (name, subschema) in properties {
                if let Some(child) = instance_obj.get(name) {
                    validate_node(subschema, child, &format!("{path}/{name}"), out);
                }
            }
        }

        let additional_allowed = obj
            .get("additionalProperties")
            .and_then(Value::as_bool)
            .unwrap_or(true);
        if !additional_allowed {
            for name in instance_obj.keys() {
                let declared = properties.is_some_and(|p| p.contains_key(name));
                if !declared {
                    out.push(Violation::new(
                        path,
                        format!("unexpected property: {name}"),
                    ));
                }
            }
        }
    }

    if let (Some(item_schema), Some(items)) = (obj.get("items"), instance.as_array()) {
        for (index, item) in items.iter().enumerate() {
            validate_node(item_schema, item, &format!("{path}/{index}"), out);
        }
    }
}

fn matches_type_keyword(type_value: &Value, instance: &Value) -> bool {
    match type_value {
        Value::String(name) => matches_type(name, instance),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .any(|name| matches_type(name, instance)),
        _ => true,
    }
}

fn matches_type(name: &str, instance: &Value) -> bool {
    match name {
        "object" => instance.is_object(),
        "array" => instance.is_array(),
        "string" => instance.is_string(),
        "boolean" => instance.is_boolean(),
        "null" => instance.is_null(),
        // An integer instance satisfies "number"; "integer" excludes floats.
        "integer" => instance.as_number().is_some_and(|n| n.is_i64() || n.is_u64()),
        "number" => instance.is_number(),
        _ => true,
    }
}

fn describe_type_keyword(type_value: &Value) -> String {
    match type_value {
        Value::String(name) => name.clone(),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" or "),
        _ => "any".into(),
    }
}

fn type_name_of(instance: &Value) -> &'static str {
    match instance {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
