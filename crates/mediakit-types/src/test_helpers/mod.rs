//! Test support: a configurable provider variant for exercising the
//! registry, resolver, and pipelines without the built-in providers.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::{json, Value as JsonValue};

use mediakit_core::{MediaBundle, MediaError, MediaItem, MEDIA_ENTITY_TYPE};

use crate::fields::{FieldDescriptor, FieldStorageDescriptor, FieldType};
use crate::provider::{
    merged_configuration, source_field_base_name, ProviderDefinition, TypeProvider,
    TypeProviderFactory,
};

/// Provider with a configurable plugin id, default configuration, and
/// canned field values.
pub struct TestProvider {
    id: String,
    defaults: JsonValue,
    configuration: JsonValue,
    field_values: BTreeMap<String, JsonValue>,
    field_type: FieldType,
    rejection: Option<String>,
}

impl TypeProvider for TestProvider {
    fn plugin_id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        "Test provider"
    }

    fn configuration(&self) -> &JsonValue {
        &self.configuration
    }

    fn default_configuration(&self) -> JsonValue {
        self.defaults.clone()
    }

    fn allowed_field_types(&self) -> Vec<FieldType> {
        vec![self.field_type]
    }

    fn provided_fields(&self) -> BTreeMap<String, String> {
        self.field_values
            .keys()
            .map(|key| (key.clone(), format!("Test field {key}")))
            .collect()
    }

    fn get_field(&self, _media: &MediaItem, key: &str) -> Option<JsonValue> {
        self.field_values.get(key).cloned()
    }

    fn thumbnail(&self, _media: &MediaItem) -> String {
        self.default_thumbnail()
    }

    fn default_thumbnail(&self) -> String {
        format!("public://media-icons/{}.png", self.id)
    }

    fn create_source_field_storage(&self) -> FieldStorageDescriptor {
        FieldStorageDescriptor::new(
            MEDIA_ENTITY_TYPE,
            source_field_base_name(&self.id),
            self.field_type,
        )
    }

    fn create_source_field_definition(&self, bundle: &MediaBundle, field_name: &str) -> FieldDescriptor {
        FieldDescriptor {
            bundle: bundle.id.clone(),
            name: field_name.to_string(),
            label: format!("{} source", self.id),
            required: true,
            settings: json!({}),
        }
    }

    fn validate(&self, _media: &MediaItem) -> Result<(), MediaError> {
        match &self.rejection {
            Some(reason) => Err(MediaError::Validation(reason.clone())),
            None => Ok(()),
        }
    }
}

/// Factory for [`TestProvider`] instances. Counts instantiations so tests
/// can assert on provider memoization.
pub struct TestProviderFactory {
    id: String,
    defaults: JsonValue,
    field_values: BTreeMap<String, JsonValue>,
    field_type: FieldType,
    rejection: Option<String>,
    created: AtomicUsize,
}

impl TestProviderFactory {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            defaults: json!({}),
            field_values: BTreeMap::new(),
            field_type: FieldType::String,
            rejection: None,
            created: AtomicUsize::new(0),
        }
    }

    /// Default configuration merged under bundle overrides.
    pub fn with_defaults(mut self, defaults: JsonValue) -> Self {
        self.defaults = defaults;
        self
    }

    /// Canned value returned by `get_field` for the given key.
    pub fn with_field_value(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.field_values.insert(key.into(), value);
        self
    }

    pub fn with_field_type(mut self, field_type: FieldType) -> Self {
        self.field_type = field_type;
        self
    }

    /// Make every created instance reject media records in `validate`.
    pub fn with_validation_error(mut self, reason: impl Into<String>) -> Self {
        self.rejection = Some(reason.into());
        self
    }

    /// Number of provider instances this factory has built.
    pub fn instantiation_count(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl TypeProviderFactory for TestProviderFactory {
    fn definition(&self) -> ProviderDefinition {
        ProviderDefinition {
            id: self.id.clone(),
            label: "Test provider".to_string(),
            description: "Provider used by tests.".to_string(),
            allowed_field_types: vec![self.field_type],
        }
    }

    fn create(&self, configuration: JsonValue) -> Arc<dyn TypeProvider> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Arc::new(TestProvider {
            id: self.id.clone(),
            configuration: merged_configuration(&self.defaults, &configuration),
            defaults: self.defaults.clone(),
            field_values: self.field_values.clone(),
            field_type: self.field_type,
            rejection: self.rejection.clone(),
        })
    }
}
