//! Field storage and field instance descriptors.
//!
//! A field storage is the entity-type-wide definition of a field's name and
//! primitive type, shared across bundles that reuse it. A field instance is
//! the bundle-specific attachment of that storage.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Primitive storage types a source field can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    StringLong,
    Integer,
    File,
    Image,
}

/// Unsaved entity-type-wide field storage descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldStorageDescriptor {
    /// Entity type the storage belongs to (always `"media"` here).
    pub entity_type: String,
    pub name: String,
    pub field_type: FieldType,
    pub settings: JsonValue,
}

impl FieldStorageDescriptor {
    pub fn new(entity_type: impl Into<String>, name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            entity_type: entity_type.into(),
            name: name.into(),
            field_type,
            settings: JsonValue::Object(serde_json::Map::new()),
        }
    }

    pub fn with_settings(mut self, settings: JsonValue) -> Self {
        self.settings = settings;
        self
    }
}

/// Unsaved bundle-specific field instance descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Owning bundle machine name.
    pub bundle: String,
    /// Field storage name this instance attaches.
    pub name: String,
    pub label: String,
    pub required: bool,
    pub settings: JsonValue,
}
