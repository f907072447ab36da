use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque version token assigned by the storage backend.
///
/// An `ETag` identifies one committed version of a blob. The backend
/// reassigns it on every successful write; clients compare tokens for
/// equality and never inspect their contents. Two equal tokens mean the
/// blob has not changed between the two observations.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ETag(String);

impl ETag {
    /// Wrap a backend-issued token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ETag({})", self.0)
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ETag {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for ETag {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_token_equality() {
        let a = ETag::new("0x8D4B9");
        let b = ETag::new("0x8D4B9");
        let c = ETag::new("0x8D4C0");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn display_is_raw_token() {
        let tag = ETag::new("abc-123");
        assert_eq!(format!("{tag}"), "abc-123");
        assert_eq!(tag.as_str(), "abc-123");
    }

    #[test]
    fn debug_names_the_type() {
        let tag = ETag::new("v1");
        assert_eq!(format!("{tag:?}"), "ETag(v1)");
    }

    #[test]
    fn serde_roundtrip_is_transparent() {
        let tag = ETag::new("serde-token");
        let json = serde_json::to_string(&tag).unwrap();
        assert_eq!(json, "\"serde-token\"");
        let parsed: ETag = serde_json::from_str(&json).unwrap();
        assert_eq!(tag, parsed);
    }

    #[test]
    fn from_conversions() {
        assert_eq!(ETag::from("x"), ETag::new("x"));
        assert_eq!(ETag::from(String::from("y")), ETag::new("y"));
    }
}
