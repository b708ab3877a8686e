//! Bundle save, rename, and delete entry points.
//!
//! A bundle save runs a strictly ordered sequence: resolve the provider,
//! guarantee the source field storage (pre-persistence), persist the
//! bundle, attach the field instance (post-persistence), then notify the
//! lifecycle coordinator. A failure at any step aborts the remaining ones.

use std::sync::Arc;

use tracing::info;

use mediakit_core::{MediaBundle, MediaError};
use mediakit_store::{BundleRepository, MediaRepository};
use mediakit_types::{ProviderCell, TypeProviderRegistry};

use crate::lifecycle::BundleLifecycleCoordinator;
use crate::source_field::SourceFieldResolver;

pub struct BundleService {
    registry: TypeProviderRegistry,
    provider_cell: ProviderCell,
    bundles: Arc<dyn BundleRepository>,
    media: Arc<dyn MediaRepository>,
    resolver: SourceFieldResolver,
    coordinator: BundleLifecycleCoordinator,
}

impl BundleService {
    pub fn new(
        registry: TypeProviderRegistry,
        bundles: Arc<dyn BundleRepository>,
        media: Arc<dyn MediaRepository>,
        resolver: SourceFieldResolver,
        coordinator: BundleLifecycleCoordinator,
    ) -> Self {
        Self {
            registry,
            provider_cell: ProviderCell::new(),
            bundles,
            media,
            resolver,
            coordinator,
        }
    }

    /// Create or update a bundle.
    ///
    /// Returns the persisted bundle, with the resolved source field name
    /// written into its type configuration.
    pub async fn save(&self, mut bundle: MediaBundle) -> Result<MediaBundle, MediaError> {
        let provider = self.provider_cell.resolve(&self.registry, &bundle)?;
        let previous = self.bundles.load(&bundle.id).await?;

        self.resolver
            .ensure_source_field(&mut bundle, provider.as_ref())
            .await?;
        self.bundles.save(bundle.clone()).await?;
        self.resolver
            .ensure_source_field_instance(&bundle, provider.as_ref())
            .await?;
        self.coordinator
            .bundle_saved(previous.as_ref(), &bundle)
            .await?;

        info!(bundle = %bundle.id, provider = provider.plugin_id(), "saved media bundle");
        Ok(bundle)
    }

    /// Change a bundle's machine name.
    ///
    /// Media references are rewritten before the id change commits; a
    /// propagation failure leaves the old bundle record in place.
    pub async fn rename(&self, old_id: &str, new_id: &str) -> Result<MediaBundle, MediaError> {
        if old_id == new_id {
            return self
                .bundles
                .load(old_id)
                .await?
                .ok_or_else(|| MediaError::BundleNotFound(old_id.to_string()));
        }
        let previous = self
            .bundles
            .load(old_id)
            .await?
            .ok_or_else(|| MediaError::BundleNotFound(old_id.to_string()))?;
        if self.bundles.exists(new_id).await? {
            return Err(MediaError::BundleExists(new_id.to_string()));
        }

        let mut renamed = previous.clone();
        renamed.id = new_id.to_string();

        self.coordinator.propagate_rename(old_id, new_id).await?;
        self.bundles.delete(old_id).await?;
        self.bundles.save(renamed.clone()).await?;
        self.coordinator
            .bundle_saved(Some(&previous), &renamed)
            .await?;

        info!(old = old_id, new = new_id, "renamed media bundle");
        Ok(renamed)
    }

    /// Delete a bundle. Refused while media records still reference it.
    pub async fn delete(&self, id: &str) -> Result<(), MediaError> {
        let bundle = self
            .bundles
            .load(id)
            .await?
            .ok_or_else(|| MediaError::BundleNotFound(id.to_string()))?;

        let count = self.media.count_by_bundle(id).await?;
        if count > 0 {
            return Err(MediaError::BundleInUse {
                id: id.to_string(),
                count,
            });
        }

        self.bundles.delete(id).await?;
        self.coordinator.bundle_deleted(&bundle).await?;
        info!(bundle = %id, "deleted media bundle");
        Ok(())
    }
}
