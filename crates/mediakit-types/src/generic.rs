//! Generic media type provider.
//!
//! The default provider for bundles that hold an opaque resource reference:
//! a plain string source field, no provided fields, and a fixed fallback
//! thumbnail under the configured icon base.

use std::sync::Arc;

use serde_json::{json, Value as JsonValue};

use mediakit_core::{MediaBundle, MediaItem, MediaSettings, MEDIA_ENTITY_TYPE};

use crate::fields::{FieldDescriptor, FieldStorageDescriptor, FieldType};
use crate::provider::{
    merged_configuration, source_field_base_name, ProviderDefinition, TypeProvider,
    TypeProviderFactory,
};

pub const GENERIC_PROVIDER_ID: &str = "generic";

pub struct GenericProvider {
    settings: MediaSettings,
    configuration: JsonValue,
}

impl GenericProvider {
    pub fn new(settings: MediaSettings, overrides: JsonValue) -> Self {
        let configuration = merged_configuration(&default_configuration(), &overrides);
        Self {
            settings,
            configuration,
        }
    }
}

fn default_configuration() -> JsonValue {
    json!({ "source_field": null })
}

impl TypeProvider for GenericProvider {
    fn plugin_id(&self) -> &str {
        GENERIC_PROVIDER_ID
    }

    fn label(&self) -> &str {
        "Generic media"
    }

    fn configuration(&self) -> &JsonValue {
        &self.configuration
    }

    fn default_configuration(&self) -> JsonValue {
        default_configuration()
    }

    fn allowed_field_types(&self) -> Vec<FieldType> {
        vec![FieldType::String, FieldType::StringLong]
    }

    fn get_field(&self, _media: &MediaItem, _key: &str) -> Option<JsonValue> {
        // The generic type surfaces no metadata.
        None
    }

    fn thumbnail(&self, _media: &MediaItem) -> String {
        self.default_thumbnail()
    }

    fn default_thumbnail(&self) -> String {
        self.settings.icon_uri("generic.png")
    }

    fn create_source_field_storage(&self) -> FieldStorageDescriptor {
        FieldStorageDescriptor::new(
            MEDIA_ENTITY_TYPE,
            source_field_base_name(GENERIC_PROVIDER_ID),
            FieldType::String,
        )
        .with_settings(json!({ "max_length": 255 }))
    }

    fn create_source_field_definition(&self, bundle: &MediaBundle, field_name: &str) -> FieldDescriptor {
        FieldDescriptor {
            bundle: bundle.id.clone(),
            name: field_name.to_string(),
            label: "Media source".to_string(),
            required: true,
            settings: json!({}),
        }
    }
}

pub struct GenericProviderFactory {
    settings: MediaSettings,
}

impl GenericProviderFactory {
    pub fn new(settings: MediaSettings) -> Self {
        Self { settings }
    }
}

impl TypeProviderFactory for GenericProviderFactory {
    fn definition(&self) -> ProviderDefinition {
        ProviderDefinition {
            id: GENERIC_PROVIDER_ID.to_string(),
            label: "Generic media".to_string(),
            description: "Media kind with an opaque resource reference.".to_string(),
            allowed_field_types: vec![FieldType::String, FieldType::StringLong],
        }
    }

    fn create(&self, configuration: JsonValue) -> Arc<dyn TypeProvider> {
        Arc::new(GenericProvider::new(self.settings.clone(), configuration))
    }
}
