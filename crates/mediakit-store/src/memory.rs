//! In-memory reference implementations of the store traits.
//!
//! Used by the test suites and by embedders that do not need durable
//! persistence. The media repository keeps a revision side-table so rename
//! propagation across revision records is observable.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use mediakit_core::{MediaBundle, MediaError, MediaItem};
use mediakit_types::{FieldDescriptor, FieldStorageDescriptor};

use crate::traits::{
    BundleRepository, CacheInvalidator, DisplayRepository, FieldStorageRepository, MediaRepository,
};

#[derive(Clone, Default)]
pub struct InMemoryFieldStorageRepository {
    storages: Arc<RwLock<HashMap<(String, String), FieldStorageDescriptor>>>,
    instances: Arc<RwLock<HashMap<(String, String), FieldDescriptor>>>,
}

impl InMemoryFieldStorageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a pre-existing storage definition, bypassing the duplicate
    /// check. Test setup helper.
    pub async fn seed_storage(&self, storage: FieldStorageDescriptor) {
        let mut storages = self.storages.write().await;
        storages.insert((storage.entity_type.clone(), storage.name.clone()), storage);
    }

    pub async fn storage_count(&self, entity_type: &str) -> usize {
        let storages = self.storages.read().await;
        storages.keys().filter(|(et, _)| et == entity_type).count()
    }
}

#[async_trait]
impl FieldStorageRepository for InMemoryFieldStorageRepository {
    async fn exists(&self, entity_type: &str, name: &str) -> Result<bool, MediaError> {
        let storages = self.storages.read().await;
        Ok(storages.contains_key(&(entity_type.to_string(), name.to_string())))
    }

    async fn load(
        &self,
        entity_type: &str,
        name: &str,
    ) -> Result<Option<FieldStorageDescriptor>, MediaError> {
        let storages = self.storages.read().await;
        Ok(storages.get(&(entity_type.to_string(), name.to_string())).cloned())
    }

    async fn definitions(
        &self,
        entity_type: &str,
    ) -> Result<BTreeMap<String, FieldStorageDescriptor>, MediaError> {
        let storages = self.storages.read().await;
        Ok(storages
            .iter()
            .filter(|((et, _), _)| et == entity_type)
            .map(|((_, name), storage)| (name.clone(), storage.clone()))
            .collect())
    }

    async fn create(&self, storage: FieldStorageDescriptor) -> Result<(), MediaError> {
        let mut storages = self.storages.write().await;
        let key = (storage.entity_type.clone(), storage.name.clone());
        if storages.contains_key(&key) {
            return Err(MediaError::FieldCreation(format!(
                "field storage '{}' already exists for entity type '{}'",
                storage.name, storage.entity_type
            )));
        }
        storages.insert(key, storage);
        Ok(())
    }

    async fn instance_exists(&self, bundle: &str, name: &str) -> Result<bool, MediaError> {
        let instances = self.instances.read().await;
        Ok(instances.contains_key(&(bundle.to_string(), name.to_string())))
    }

    async fn create_instance(&self, field: FieldDescriptor) -> Result<(), MediaError> {
        let mut instances = self.instances.write().await;
        let key = (field.bundle.clone(), field.name.clone());
        if instances.contains_key(&key) {
            return Err(MediaError::FieldCreation(format!(
                "field '{}' already attached to bundle '{}'",
                field.name, field.bundle
            )));
        }
        instances.insert(key, field);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryBundleRepository {
    bundles: Arc<RwLock<HashMap<String, MediaBundle>>>,
}

impl InMemoryBundleRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BundleRepository for InMemoryBundleRepository {
    async fn save(&self, bundle: MediaBundle) -> Result<(), MediaError> {
        let mut bundles = self.bundles.write().await;
        bundles.insert(bundle.id.clone(), bundle);
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<Option<MediaBundle>, MediaError> {
        let bundles = self.bundles.read().await;
        Ok(bundles.get(id).cloned())
    }

    async fn exists(&self, id: &str) -> Result<bool, MediaError> {
        let bundles = self.bundles.read().await;
        Ok(bundles.contains_key(id))
    }

    async fn delete(&self, id: &str) -> Result<(), MediaError> {
        let mut bundles = self.bundles.write().await;
        bundles
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| MediaError::BundleNotFound(id.to_string()))
    }

    async fn list(&self) -> Result<Vec<MediaBundle>, MediaError> {
        let bundles = self.bundles.read().await;
        let mut all: Vec<MediaBundle> = bundles.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryMediaRepository {
    items: Arc<RwLock<HashMap<Uuid, MediaItem>>>,
    /// Revision shadow table: every saved revision, in save order.
    revisions: Arc<RwLock<Vec<MediaItem>>>,
}

impl InMemoryMediaRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn revisions_for(&self, id: Uuid) -> Vec<MediaItem> {
        let revisions = self.revisions.read().await;
        revisions.iter().filter(|item| item.id == id).cloned().collect()
    }
}

#[async_trait]
impl MediaRepository for InMemoryMediaRepository {
    async fn save(&self, media: MediaItem) -> Result<(), MediaError> {
        let mut items = self.items.write().await;
        let mut revisions = self.revisions.write().await;
        revisions.push(media.clone());
        items.insert(media.id, media);
        Ok(())
    }

    async fn load(&self, id: Uuid) -> Result<Option<MediaItem>, MediaError> {
        let items = self.items.read().await;
        Ok(items.get(&id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<(), MediaError> {
        let mut items = self.items.write().await;
        let mut revisions = self.revisions.write().await;
        revisions.retain(|item| item.id != id);
        items
            .remove(&id)
            .map(|_| ())
            .ok_or(MediaError::MediaNotFound(id))
    }

    async fn count_by_bundle(&self, bundle_id: &str) -> Result<u64, MediaError> {
        let items = self.items.read().await;
        Ok(items.values().filter(|item| item.bundle == bundle_id).count() as u64)
    }

    async fn rename_bundle(&self, old_id: &str, new_id: &str) -> Result<u64, MediaError> {
        let mut items = self.items.write().await;
        let mut revisions = self.revisions.write().await;

        let mut updated = 0u64;
        for item in items.values_mut() {
            if item.bundle == old_id {
                item.bundle = new_id.to_string();
                updated += 1;
            }
        }
        for revision in revisions.iter_mut() {
            if revision.bundle == old_id {
                revision.bundle = new_id.to_string();
            }
        }
        Ok(updated)
    }
}

/// Records invalidated tags for assertions.
#[derive(Clone, Default)]
pub struct InMemoryCacheInvalidator {
    invalidated: Arc<RwLock<Vec<String>>>,
}

impl InMemoryCacheInvalidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn invalidated(&self) -> Vec<String> {
        let invalidated = self.invalidated.read().await;
        invalidated.clone()
    }
}

#[async_trait]
impl CacheInvalidator for InMemoryCacheInvalidator {
    async fn invalidate_tags(&self, tags: &[String]) -> Result<(), MediaError> {
        let mut invalidated = self.invalidated.write().await;
        invalidated.extend_from_slice(tags);
        Ok(())
    }
}

/// Records display attachments for assertions.
#[derive(Clone, Default)]
pub struct InMemoryDisplayRepository {
    attached: Arc<RwLock<HashSet<(String, String)>>>,
}

impl InMemoryDisplayRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_attached(&self, bundle_id: &str, field_name: &str) -> bool {
        let attached = self.attached.read().await;
        attached.contains(&(bundle_id.to_string(), field_name.to_string()))
    }
}

#[async_trait]
impl DisplayRepository for InMemoryDisplayRepository {
    async fn attach_to_displays(
        &self,
        bundle_id: &str,
        field: &FieldDescriptor,
    ) -> Result<(), MediaError> {
        let mut attached = self.attached.write().await;
        attached.insert((bundle_id.to_string(), field.name.clone()));
        Ok(())
    }
}
