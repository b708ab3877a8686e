//! Type provider contract and instantiation plumbing.

use std::collections::BTreeMap;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde_json::Value as JsonValue;

use mediakit_core::merge::merge_deep;
use mediakit_core::models::bundle::SOURCE_FIELD_KEY;
use mediakit_core::{MediaBundle, MediaError, MediaItem};

use crate::fields::{FieldDescriptor, FieldStorageDescriptor, FieldType};
use crate::registry::TypeProviderRegistry;

/// Static description of one registered provider variant.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderDefinition {
    pub id: String,
    pub label: String,
    pub description: String,
    /// Storage primitive types acceptable for this provider's source field.
    pub allowed_field_types: Vec<FieldType>,
}

/// Pluggable behavior backing one media bundle.
///
/// Each bundle owns its own configured instance; instances are never shared
/// across bundles even when the plugin id repeats. Unknown provided-field
/// keys and missing thumbnails are sentinel conditions (`None`, fallback
/// URI), never errors.
pub trait TypeProvider: Send + Sync {
    fn plugin_id(&self) -> &str;

    fn label(&self) -> &str;

    /// Effective configuration: defaults with bundle overrides merged on top.
    fn configuration(&self) -> &JsonValue;

    /// Base configuration merged under bundle overrides.
    fn default_configuration(&self) -> JsonValue {
        JsonValue::Object(serde_json::Map::new())
    }

    /// Storage primitive types this provider accepts for its source field.
    fn allowed_field_types(&self) -> Vec<FieldType>;

    /// Semantic fields this provider can surface, keyed by field name with a
    /// human-readable description. May be empty.
    fn provided_fields(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    /// Fetch one semantic field's value for a media record. `None` means
    /// "unavailable"; unknown keys never fail.
    fn get_field(&self, media: &MediaItem, key: &str) -> Option<JsonValue>;

    /// Thumbnail URI for a media record. Always returns a valid, non-empty
    /// URI; falls back to [`TypeProvider::default_thumbnail`].
    fn thumbnail(&self, media: &MediaItem) -> String;

    /// Fallback thumbnail URI used when no type-specific one can be computed.
    fn default_thumbnail(&self) -> String;

    /// Describe the field storage this provider needs. The descriptor's
    /// candidate name is `field_media_<plugin_id>`; the source field
    /// resolver overrides it when probing for a collision-free name.
    fn create_source_field_storage(&self) -> FieldStorageDescriptor;

    /// Bind the source field storage to a specific bundle.
    fn create_source_field_definition(&self, bundle: &MediaBundle, field_name: &str) -> FieldDescriptor;

    /// Provider-specific validation hook; default accepts everything.
    fn validate(&self, _media: &MediaItem) -> Result<(), MediaError> {
        Ok(())
    }

    /// The source field name carried in the merged configuration, if set.
    fn configured_source_field(&self) -> Option<String> {
        self.configuration()
            .get(SOURCE_FIELD_KEY)
            .and_then(JsonValue::as_str)
            .map(str::to_string)
    }
}

impl fmt::Debug for dyn TypeProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeProvider")
            .field("plugin_id", &self.plugin_id())
            .finish()
    }
}

/// Constructs configured provider instances; one factory per variant is
/// registered with the [`TypeProviderRegistry`] at process start.
pub trait TypeProviderFactory: Send + Sync {
    fn definition(&self) -> ProviderDefinition;

    /// Build an instance with the given bundle overrides merged over the
    /// variant's default configuration.
    fn create(&self, configuration: JsonValue) -> Arc<dyn TypeProvider>;
}

/// Merge bundle overrides over provider defaults.
pub fn merged_configuration(defaults: &JsonValue, overrides: &JsonValue) -> JsonValue {
    merge_deep(defaults, overrides)
}

/// Base candidate name for a provider's source field.
pub fn source_field_base_name(plugin_id: &str) -> String {
    format!("field_media_{plugin_id}")
}

/// Memoized provider lookup.
///
/// Keyed by a hash of `(type, configuration)`, so reassigning the bundle's
/// configuration invalidates the cached instance without any manual cache
/// clearing. Holds at most one instance; resolving a bundle with a
/// different key rebuilds and replaces it.
#[derive(Default)]
pub struct ProviderCell {
    slot: Mutex<Option<(u64, Arc<dyn TypeProvider>)>>,
}

impl ProviderCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the bundle's provider, rebuilding only when the bundle's
    /// provider id or configuration changed since the last call.
    pub fn resolve(
        &self,
        registry: &TypeProviderRegistry,
        bundle: &MediaBundle,
    ) -> Result<Arc<dyn TypeProvider>, MediaError> {
        let key = bundle_config_hash(bundle);
        let mut slot = self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some((cached_key, provider)) = slot.as_ref() {
            if *cached_key == key {
                return Ok(Arc::clone(provider));
            }
        }
        let provider = registry.provider_for(bundle)?;
        *slot = Some((key, Arc::clone(&provider)));
        Ok(provider)
    }
}

impl fmt::Debug for ProviderCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let populated = self
            .slot
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false);
        f.debug_struct("ProviderCell").field("populated", &populated).finish()
    }
}

fn bundle_config_hash(bundle: &MediaBundle) -> u64 {
    let mut hasher = DefaultHasher::new();
    bundle.type_provider.hash(&mut hasher);
    bundle.type_configuration.to_string().hash(&mut hasher);
    hasher.finish()
}
