//! On-disk shapes of `modifier.json`.
//!
//! Early builds wrote the file-name → metadata map as the whole document.
//! Versioned builds wrap it as `{ "version": [..], "columns": {..} }`. Both
//! decode into [`StoredModifierDocument`] and upgrade to the versioned form.

use crate::types::{AppVersion, DirectoryModifierDocument, FileMetadata};
use serde_json::Value;
use std::collections::BTreeMap;

/// Keys whose presence marks the versioned shape.
const VERSION_KEYS: [&str; 2] = ["version", "ver"];

/// A decoded `modifier.json` in either shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredModifierDocument {
    Versioned(DirectoryModifierDocument),
    /// Pre-versioning body: the columns map itself
    Legacy(BTreeMap<String, FileMetadata>),
}

impl StoredModifierDocument {
    pub fn decode(value: Value) -> serde_json::Result<Self> {
        let versioned = match &value {
            Value::Object(map) => VERSION_KEYS.iter().any(|key| map.contains_key(*key)),
            other => {
                return Err(serde::de::Error::custom(format!(
                    "expected a JSON object, found {}",
                    json_kind(other)
                )))
            }
        };

        if versioned {
            serde_json::from_value(value).map(StoredModifierDocument::Versioned)
        } else {
            serde_json::from_value(value).map(StoredModifierDocument::Legacy)
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, StoredModifierDocument::Legacy(_))
    }

    /// Versioned form stamped with `version`. Legacy entries carry over untouched.
    pub fn upgrade(self, version: AppVersion) -> DirectoryModifierDocument {
        match self {
            StoredModifierDocument::Versioned(mut document) => {
                document.version = version;
                document
            }
            StoredModifierDocument::Legacy(columns) => DirectoryModifierDocument { version, columns },
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
