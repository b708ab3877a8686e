//! Media record save pipeline.
//!
//! Applies the bundle's defaults and provider-derived values before
//! persisting: name synthesis, field-map population of empty destination
//! fields, thumbnail resolution, and revision bookkeeping.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use mediakit_core::{MediaBundle, MediaError, MediaItem};
use mediakit_store::{BundleRepository, MediaRepository};
use mediakit_types::{ProviderCell, TypeProvider, TypeProviderRegistry};

pub struct MediaService {
    registry: TypeProviderRegistry,
    provider_cell: ProviderCell,
    bundles: Arc<dyn BundleRepository>,
    media: Arc<dyn MediaRepository>,
}

impl MediaService {
    pub fn new(
        registry: TypeProviderRegistry,
        bundles: Arc<dyn BundleRepository>,
        media: Arc<dyn MediaRepository>,
    ) -> Self {
        Self {
            registry,
            provider_cell: ProviderCell::new(),
            bundles,
            media,
        }
    }

    /// Persist a media record, applying bundle defaults and
    /// provider-derived values first.
    pub async fn save(&self, mut item: MediaItem) -> Result<MediaItem, MediaError> {
        let bundle = self
            .bundles
            .load(&item.bundle)
            .await?
            .ok_or_else(|| MediaError::BundleNotFound(item.bundle.clone()))?;
        let provider = self.provider_cell.resolve(&self.registry, &bundle)?;
        let existing = self.media.load(item.id).await?;

        if let Some(prev) = &existing {
            if prev.bundle != item.bundle {
                return Err(MediaError::ImmutableBundleReference {
                    media_id: item.id,
                    from: prev.bundle.clone(),
                    to: item.bundle.clone(),
                });
            }
        }

        let now = Utc::now();
        if item.name.trim().is_empty() {
            item.name = format!("media:{}:{}", item.bundle, item.id);
        }

        match &existing {
            None => {
                item.published = bundle.status;
                item.created_at = now;
                item.revision_id = 1;
                item.revision_created_at = Some(now);
            }
            Some(prev) => {
                item.created_at = prev.created_at;
                if bundle.new_revision {
                    item.revision_id = prev.revision_id + 1;
                    item.revision_created_at = Some(now);
                } else {
                    item.revision_id = prev.revision_id;
                    // Keep the previous log entry instead of clobbering it
                    // with an empty one.
                    if item
                        .revision_log_message
                        .as_deref()
                        .map_or(true, str::is_empty)
                    {
                        item.revision_log_message = prev.revision_log_message.clone();
                    }
                }
            }
        }
        item.changed_at = now;
        if item.revision_author_id.is_none() {
            item.revision_author_id = item.publisher_id;
        }

        self.apply_field_map(&bundle, provider.as_ref(), &mut item);
        item.thumbnail_uri = Some(self.resolve_thumbnail(&bundle, provider.as_ref(), &item));

        provider.validate(&item)?;
        self.media.save(item.clone()).await?;
        Ok(item)
    }

    pub async fn delete(&self, item: &MediaItem) -> Result<(), MediaError> {
        self.media.delete(item.id).await
    }

    /// Populate empty field-map destinations from provider-supplied
    /// values. Existing data is never overwritten.
    fn apply_field_map(&self, bundle: &MediaBundle, provider: &dyn TypeProvider, item: &mut MediaItem) {
        for (source_key, destination) in &bundle.field_map {
            if !item.value_is_empty(destination) {
                continue;
            }
            if let Some(value) = provider.get_field(item, source_key) {
                debug!(
                    media = %item.id,
                    source = %source_key,
                    destination = %destination,
                    "populated mapped field"
                );
                item.set_value(destination, value);
            }
        }
    }

    fn resolve_thumbnail(
        &self,
        bundle: &MediaBundle,
        provider: &dyn TypeProvider,
        item: &MediaItem,
    ) -> String {
        if bundle.queue_thumbnail_downloads {
            // The external queue downloads the real thumbnail later; until
            // then the provider's fallback is shown.
            debug!(media = %item.id, "thumbnail download deferred to queue");
            provider.default_thumbnail()
        } else {
            provider.thumbnail(item)
        }
    }
}
