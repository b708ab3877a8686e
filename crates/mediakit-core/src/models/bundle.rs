//! Media bundle configuration entity.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Default type provider selected for new bundles.
pub const DEFAULT_TYPE_PROVIDER: &str = "generic";

/// Configuration key that holds the resolved source field name.
pub const SOURCE_FIELD_KEY: &str = "source_field";

/// A named sub-type of the media entity ("image", "video", ...).
///
/// A bundle selects exactly one type provider and carries that provider's
/// opaque configuration. The provider-required source field is resolved at
/// save time and written back into `type_configuration["source_field"]` so
/// the bundle record and the field name persist in one round-trip.
///
/// Serialized with the durable key set
/// `id, label, description, type, type_configuration, field_map,
/// new_revision, queue_thumbnail_downloads, status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaBundle {
    /// Machine name. Immutable once media records reference it, except via
    /// the explicit rename pipeline.
    pub id: String,
    /// Human-readable display name.
    pub label: String,
    /// Free-text description.
    pub description: String,
    /// Selected type provider id.
    #[serde(rename = "type")]
    pub type_provider: String,
    /// Provider-specific configuration, merged over the provider's defaults
    /// at instantiation time.
    pub type_configuration: JsonValue,
    /// Provider field key to destination entity field name. Destination
    /// fields are auto-populated on media save when empty.
    pub field_map: BTreeMap<String, String>,
    /// Whether media saves create a new revision by default.
    pub new_revision: bool,
    /// Whether thumbnail downloads are deferred to the external queue.
    pub queue_thumbnail_downloads: bool,
    /// Whether new media in this bundle default to published.
    pub status: bool,
}

impl MediaBundle {
    /// Create a bundle with the given machine name and default settings.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            description: String::new(),
            type_provider: DEFAULT_TYPE_PROVIDER.to_string(),
            type_configuration: JsonValue::Object(serde_json::Map::new()),
            field_map: BTreeMap::new(),
            new_revision: false,
            queue_thumbnail_downloads: false,
            status: true,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_type_provider(mut self, provider_id: impl Into<String>) -> Self {
        self.type_provider = provider_id.into();
        self
    }

    /// Replace the provider configuration. Provider instances are memoized
    /// by a hash of `(type, configuration)`, so reassigning the
    /// configuration implicitly invalidates any cached instance.
    pub fn set_type_configuration(&mut self, configuration: JsonValue) {
        self.type_configuration = configuration;
    }

    /// The resolved source field name, if one has been configured.
    pub fn source_field(&self) -> Option<String> {
        self.type_configuration
            .get(SOURCE_FIELD_KEY)
            .and_then(JsonValue::as_str)
            .map(str::to_string)
    }

    /// Record the resolved source field name in the configuration so it is
    /// captured by the same save transaction as the bundle itself.
    pub fn set_source_field(&mut self, name: &str) {
        if !self.type_configuration.is_object() {
            self.type_configuration = JsonValue::Object(serde_json::Map::new());
        }
        if let Some(map) = self.type_configuration.as_object_mut() {
            map.insert(SOURCE_FIELD_KEY.to_string(), JsonValue::String(name.to_string()));
        }
    }
}
