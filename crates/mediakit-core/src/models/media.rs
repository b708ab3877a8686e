//! Media content record.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// A media record referencing one bundle.
///
/// Configurable fields (the bundle's source field and any field-map
/// destinations) live in the dynamic `values` map; base fields are typed
/// columns. The bundle reference is required and immutable once persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: Uuid,
    /// Owning bundle machine name.
    pub bundle: String,
    /// Display name; synthesized as `media:<bundle>:<uuid>` at save time
    /// when left empty.
    pub name: String,
    pub publisher_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub changed_at: DateTime<Utc>,
    pub published: bool,
    /// Derived, provider-set thumbnail URI. Read-only for callers.
    pub thumbnail_uri: Option<String>,
    pub revision_id: u64,
    pub revision_log_message: Option<String>,
    pub revision_created_at: Option<DateTime<Utc>>,
    pub revision_author_id: Option<Uuid>,
    /// Values of configurable fields, keyed by field name.
    pub values: BTreeMap<String, JsonValue>,
}

impl MediaItem {
    /// Create an unsaved media record for the given bundle.
    pub fn new(bundle: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            bundle: bundle.into(),
            name: String::new(),
            publisher_id: None,
            created_at: now,
            changed_at: now,
            published: false,
            thumbnail_uri: None,
            revision_id: 0,
            revision_log_message: None,
            revision_created_at: None,
            revision_author_id: None,
            values: BTreeMap::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_publisher(mut self, publisher_id: Uuid) -> Self {
        self.publisher_id = Some(publisher_id);
        self
    }

    pub fn with_value(mut self, field: impl Into<String>, value: JsonValue) -> Self {
        self.values.insert(field.into(), value);
        self
    }

    pub fn value(&self, field: &str) -> Option<&JsonValue> {
        self.values.get(field)
    }

    pub fn set_value(&mut self, field: impl Into<String>, value: JsonValue) {
        self.values.insert(field.into(), value);
    }

    /// A field is empty when absent, JSON null, an empty string, or an
    /// empty array. Field-map population only fills empty destinations.
    pub fn value_is_empty(&self, field: &str) -> bool {
        match self.values.get(field) {
            None | Some(JsonValue::Null) => true,
            Some(JsonValue::String(s)) => s.is_empty(),
            Some(JsonValue::Array(items)) => items.is_empty(),
            Some(_) => false,
        }
    }
}
