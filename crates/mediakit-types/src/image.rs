//! Image media type provider.
//!
//! Stores an image reference in an image- or file-typed source field and
//! surfaces the dimensions and MIME type recorded on the source value. The
//! source value is a JSON object of the form
//! `{"uri": "...", "width": .., "height": .., "mime": ".."}`.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{json, Value as JsonValue};

use mediakit_core::{MediaBundle, MediaItem, MediaSettings, MEDIA_ENTITY_TYPE};

use crate::fields::{FieldDescriptor, FieldStorageDescriptor, FieldType};
use crate::provider::{
    merged_configuration, source_field_base_name, ProviderDefinition, TypeProvider,
    TypeProviderFactory,
};

pub const IMAGE_PROVIDER_ID: &str = "image";

pub struct ImageProvider {
    settings: MediaSettings,
    configuration: JsonValue,
}

impl ImageProvider {
    pub fn new(settings: MediaSettings, overrides: JsonValue) -> Self {
        let configuration = merged_configuration(&default_configuration(), &overrides);
        Self {
            settings,
            configuration,
        }
    }

    /// The source value object for a media record, when present.
    fn source_value<'a>(&self, media: &'a MediaItem) -> Option<&'a JsonValue> {
        let field = self.configured_source_field()?;
        media.value(&field)
    }
}

fn default_configuration() -> JsonValue {
    json!({ "source_field": null })
}

impl TypeProvider for ImageProvider {
    fn plugin_id(&self) -> &str {
        IMAGE_PROVIDER_ID
    }

    fn label(&self) -> &str {
        "Image"
    }

    fn configuration(&self) -> &JsonValue {
        &self.configuration
    }

    fn default_configuration(&self) -> JsonValue {
        default_configuration()
    }

    fn allowed_field_types(&self) -> Vec<FieldType> {
        vec![FieldType::Image, FieldType::File]
    }

    fn provided_fields(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("width".to_string(), "Image width in pixels".to_string()),
            ("height".to_string(), "Image height in pixels".to_string()),
            ("mime".to_string(), "MIME type of the image".to_string()),
        ])
    }

    fn get_field(&self, media: &MediaItem, key: &str) -> Option<JsonValue> {
        if !matches!(key, "width" | "height" | "mime") {
            return None;
        }
        let value = self.source_value(media)?.get(key)?;
        if value.is_null() {
            return None;
        }
        Some(value.clone())
    }

    fn thumbnail(&self, media: &MediaItem) -> String {
        self.source_value(media)
            .and_then(|value| value.get("uri"))
            .and_then(JsonValue::as_str)
            .filter(|uri| !uri.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.default_thumbnail())
    }

    fn default_thumbnail(&self) -> String {
        self.settings.icon_uri("image.png")
    }

    fn create_source_field_storage(&self) -> FieldStorageDescriptor {
        FieldStorageDescriptor::new(
            MEDIA_ENTITY_TYPE,
            source_field_base_name(IMAGE_PROVIDER_ID),
            FieldType::Image,
        )
    }

    fn create_source_field_definition(&self, bundle: &MediaBundle, field_name: &str) -> FieldDescriptor {
        FieldDescriptor {
            bundle: bundle.id.clone(),
            name: field_name.to_string(),
            label: "Image".to_string(),
            required: true,
            settings: json!({}),
        }
    }
}

pub struct ImageProviderFactory {
    settings: MediaSettings,
}

impl ImageProviderFactory {
    pub fn new(settings: MediaSettings) -> Self {
        Self { settings }
    }
}

impl TypeProviderFactory for ImageProviderFactory {
    fn definition(&self) -> ProviderDefinition {
        ProviderDefinition {
            id: IMAGE_PROVIDER_ID.to_string(),
            label: "Image".to_string(),
            description: "Media kind backed by a locally stored image.".to_string(),
            allowed_field_types: vec![FieldType::Image, FieldType::File],
        }
    }

    fn create(&self, configuration: JsonValue) -> Arc<dyn TypeProvider> {
        Arc::new(ImageProvider::new(self.settings.clone(), configuration))
    }
}
