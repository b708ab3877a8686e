//! Bundle lifecycle coordination.
//!
//! Reacts to bundle save and delete transitions: cache tag invalidation,
//! rename propagation to media records, and embedder hooks. Transitions
//! are keyed on explicit before/after bundle snapshots supplied by the
//! save pipeline.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use mediakit_core::{MediaBundle, MediaError};
use mediakit_store::{bundle_list_tag, bundle_tag, CacheInvalidator, MediaRepository};

/// Hooks fired after bundle transitions commit. Embedders implement this
/// to react to bundle changes (search reindexing, audit, ...).
#[async_trait]
pub trait BundleEventListener: Send + Sync {
    async fn bundle_created(&self, id: &str);

    async fn bundle_renamed(&self, old_id: &str, new_id: &str);

    async fn bundle_deleted(&self, id: &str);
}

/// Listener for when no embedder hooks are wired up.
pub struct NoOpBundleEventListener;

#[async_trait]
impl BundleEventListener for NoOpBundleEventListener {
    async fn bundle_created(&self, _id: &str) {}

    async fn bundle_renamed(&self, _old_id: &str, _new_id: &str) {}

    async fn bundle_deleted(&self, _id: &str) {}
}

pub struct BundleLifecycleCoordinator {
    media: Arc<dyn MediaRepository>,
    cache: Arc<dyn CacheInvalidator>,
    listener: Arc<dyn BundleEventListener>,
}

impl BundleLifecycleCoordinator {
    pub fn new(
        media: Arc<dyn MediaRepository>,
        cache: Arc<dyn CacheInvalidator>,
        listener: Arc<dyn BundleEventListener>,
    ) -> Self {
        Self {
            media,
            cache,
            listener,
        }
    }

    /// Rewrite the bundle reference on every media record pointing at
    /// `old_id`, base and revision records included.
    ///
    /// Runs before the id change commits: a failure here is fatal and the
    /// rename must not be considered committed.
    pub async fn propagate_rename(&self, old_id: &str, new_id: &str) -> Result<u64, MediaError> {
        let updated = self
            .media
            .rename_bundle(old_id, new_id)
            .await
            .map_err(|err| MediaError::RenamePropagation {
                old_id: old_id.to_string(),
                new_id: new_id.to_string(),
                reason: err.to_string(),
            })?;
        info!(old = old_id, new = new_id, updated, "propagated bundle rename to media records");
        Ok(updated)
    }

    /// Post-persistence notification for a bundle save. The transition is
    /// derived by comparing the previously persisted snapshot to the
    /// current one.
    pub async fn bundle_saved(
        &self,
        previous: Option<&MediaBundle>,
        current: &MediaBundle,
    ) -> Result<(), MediaError> {
        match previous {
            None => {
                self.cache.invalidate_tags(&[bundle_list_tag()]).await?;
                debug!(bundle = %current.id, "bundle created");
                self.listener.bundle_created(&current.id).await;
            }
            Some(prev) if prev.id != current.id => {
                self.cache.invalidate_tags(&[bundle_list_tag()]).await?;
                debug!(old = %prev.id, new = %current.id, "bundle renamed");
                self.listener.bundle_renamed(&prev.id, &current.id).await;
            }
            Some(_) => {
                self.cache.invalidate_tags(&[bundle_tag(&current.id)]).await?;
            }
        }
        Ok(())
    }

    /// Post-delete notification.
    pub async fn bundle_deleted(&self, bundle: &MediaBundle) -> Result<(), MediaError> {
        self.cache
            .invalidate_tags(&[bundle_list_tag(), bundle_tag(&bundle.id)])
            .await?;
        debug!(bundle = %bundle.id, "bundle deleted");
        self.listener.bundle_deleted(&bundle.id).await;
        Ok(())
    }
}
