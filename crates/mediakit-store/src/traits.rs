//! Collaborator contracts implemented by the persistence layer.

use std::collections::BTreeMap;

use async_trait::async_trait;
use uuid::Uuid;

use mediakit_core::{MediaBundle, MediaError, MediaItem};
use mediakit_types::{FieldDescriptor, FieldStorageDescriptor};

/// Aggregate cache tag invalidated when the set of bundles changes.
pub fn bundle_list_tag() -> String {
    "media_bundles".to_string()
}

/// Per-bundle cache tag.
pub fn bundle_tag(id: &str) -> String {
    format!("media_bundle:{id}")
}

/// Entity-type-wide field storage definitions and their bundle instances.
#[async_trait]
pub trait FieldStorageRepository: Send + Sync {
    /// Whether a storage definition with this name exists for the entity
    /// type, regardless of bundle.
    async fn exists(&self, entity_type: &str, name: &str) -> Result<bool, MediaError>;

    async fn load(
        &self,
        entity_type: &str,
        name: &str,
    ) -> Result<Option<FieldStorageDescriptor>, MediaError>;

    /// Point-in-time snapshot of all storage definitions for an entity
    /// type, keyed by field name.
    async fn definitions(
        &self,
        entity_type: &str,
    ) -> Result<BTreeMap<String, FieldStorageDescriptor>, MediaError>;

    /// Persist a new storage definition. A duplicate name must be rejected
    /// (uniqueness is the engine's constraint; a loser in a create race
    /// sees the rejection here).
    async fn create(&self, storage: FieldStorageDescriptor) -> Result<(), MediaError>;

    /// Whether the bundle already has an instance of the named field.
    async fn instance_exists(&self, bundle: &str, name: &str) -> Result<bool, MediaError>;

    async fn create_instance(&self, field: FieldDescriptor) -> Result<(), MediaError>;
}

/// Bundle configuration records.
#[async_trait]
pub trait BundleRepository: Send + Sync {
    async fn save(&self, bundle: MediaBundle) -> Result<(), MediaError>;

    async fn load(&self, id: &str) -> Result<Option<MediaBundle>, MediaError>;

    async fn exists(&self, id: &str) -> Result<bool, MediaError>;

    async fn delete(&self, id: &str) -> Result<(), MediaError>;

    async fn list(&self) -> Result<Vec<MediaBundle>, MediaError>;
}

/// Media content records, including their revision shadow table.
#[async_trait]
pub trait MediaRepository: Send + Sync {
    async fn save(&self, media: MediaItem) -> Result<(), MediaError>;

    async fn load(&self, id: Uuid) -> Result<Option<MediaItem>, MediaError>;

    async fn delete(&self, id: Uuid) -> Result<(), MediaError>;

    /// Number of media records referencing the bundle; the delete guard.
    async fn count_by_bundle(&self, bundle_id: &str) -> Result<u64, MediaError>;

    /// Bulk-rewrite the bundle reference on every media record (base and
    /// revision records) pointing at `old_id`. Returns the number of base
    /// records updated.
    async fn rename_bundle(&self, old_id: &str, new_id: &str) -> Result<u64, MediaError>;
}

/// Cache tag invalidation.
#[async_trait]
pub trait CacheInvalidator: Send + Sync {
    async fn invalidate_tags(&self, tags: &[String]) -> Result<(), MediaError>;
}

/// Default form/view display attachment for newly created field instances.
#[async_trait]
pub trait DisplayRepository: Send + Sync {
    async fn attach_to_displays(
        &self,
        bundle_id: &str,
        field: &FieldDescriptor,
    ) -> Result<(), MediaError>;
}
