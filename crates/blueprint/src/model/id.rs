//! Namespaced schematic identifiers.
//!
//! Identifiers take the form `namespace:path`, where both halves are
//! restricted to lowercase ASCII so they are safe as file names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Key of a stored schematic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SchematicId {
    namespace: String,
    path: String,
}

impl SchematicId {
    /// Creates an id, validating both halves.
    pub fn new(namespace: &str, path: &str) -> Result<Self, StoreError> {
        if !is_valid_namespace(namespace) || !is_valid_path(path) {
            return Err(StoreError::InvalidId(format!("{namespace}:{path}")));
        }
        Ok(Self {
            namespace: namespace.to_string(),
            path: path.to_string(),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Same namespace, different path.
    pub fn with_path(&self, path: &str) -> Result<Self, StoreError> {
        Self::new(&self.namespace, path)
    }
}

fn is_valid_namespace(s: &str) -> bool {
    !s.is_empty()
        && s
            .bytes()
            .all(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' | b'.'))
}

fn is_valid_path(s: &str) -> bool {
    s.split('/')
        .all(|segment| is_valid_namespace(segment) && segment != "." && segment != "..")
}

impl fmt::Display for SchematicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl FromStr for SchematicId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (namespace, path) = s
            .split_once(':')
            .ok_or_else(|| StoreError::InvalidId(s.to_string()))?;
        Self::new(namespace, path)
    }
}

impl TryFrom<String> for SchematicId {
    type Error = StoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SchematicId> for String {
    fn from(value: SchematicId) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parse_roundtrip() {
        let id = SchematicId::new("blueprints", "tower_2").unwrap();
        assert_eq!(id.to_string(), "blueprints:tower_2");
        let parsed: SchematicId = "blueprints:tower_2".parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_rejects_invalid() {
        assert!("no_colon".parse::<SchematicId>().is_err());
        assert!("Upper:case".parse::<SchematicId>().is_err());
        assert!("ns:".parse::<SchematicId>().is_err());
        assert!("ns:has space".parse::<SchematicId>().is_err());
        assert!("ns:../escape".parse::<SchematicId>().is_err());
        assert!("ns:a//b".parse::<SchematicId>().is_err());
        assert!("ns:towers/north".parse::<SchematicId>().is_ok());
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        let a = SchematicId::new("blueprints", "a").unwrap();
        let b = SchematicId::new("blueprints", "b").unwrap();
        assert!(a < b);
    }
}
