//! End-to-end tests over the in-memory stores: bundle creation with source
//! field resolution, name de-duplication across bundles, rename and delete
//! lifecycle, and the media save pipeline.

use std::sync::Arc;

use serde_json::json;

use mediakit_core::{MediaBundle, MediaError, MediaItem, MediaSettings};
use mediakit_services::{BundleLifecycleCoordinator, BundleService, MediaService, NoOpBundleEventListener, SourceFieldResolver};
use mediakit_store::{
    BundleRepository, FieldStorageRepository, InMemoryBundleRepository, InMemoryCacheInvalidator,
    InMemoryDisplayRepository, InMemoryFieldStorageRepository, InMemoryMediaRepository,
    MediaRepository,
};
use mediakit_types::test_helpers::TestProviderFactory;
use mediakit_types::{
    FieldStorageDescriptor, FieldType, GenericProviderFactory, ImageProviderFactory,
    TypeProviderRegistry,
};

struct Harness {
    fields: InMemoryFieldStorageRepository,
    bundles: InMemoryBundleRepository,
    media: InMemoryMediaRepository,
    cache: InMemoryCacheInvalidator,
    displays: InMemoryDisplayRepository,
    bundle_service: BundleService,
    media_service: MediaService,
}

fn harness() -> Harness {
    let settings = MediaSettings::default();
    let registry = TypeProviderRegistry::new();
    registry.register(Arc::new(GenericProviderFactory::new(settings.clone())));
    registry.register(Arc::new(ImageProviderFactory::new(settings)));
    registry.register(Arc::new(
        TestProviderFactory::new("gallery")
            .with_field_value("title", json!("Gallery title"))
            .with_field_value("count", json!(12)),
    ));
    registry.register(Arc::new(
        TestProviderFactory::new("strict").with_validation_error("source value is required"),
    ));

    let fields = InMemoryFieldStorageRepository::new();
    let bundles = InMemoryBundleRepository::new();
    let media = InMemoryMediaRepository::new();
    let cache = InMemoryCacheInvalidator::new();
    let displays = InMemoryDisplayRepository::new();

    let resolver = SourceFieldResolver::new(Arc::new(fields.clone()), Arc::new(displays.clone()));
    let coordinator = BundleLifecycleCoordinator::new(
        Arc::new(media.clone()),
        Arc::new(cache.clone()),
        Arc::new(NoOpBundleEventListener),
    );
    let bundle_service = BundleService::new(
        registry.clone(),
        Arc::new(bundles.clone()),
        Arc::new(media.clone()),
        resolver,
        coordinator,
    );
    let media_service = MediaService::new(registry, Arc::new(bundles.clone()), Arc::new(media.clone()));

    Harness {
        fields,
        bundles,
        media,
        cache,
        displays,
        bundle_service,
        media_service,
    }
}

#[tokio::test]
async fn test_generic_bundle_gets_string_source_field() {
    // Scenario: create bundle id="video", type="generic".
    let h = harness();
    let bundle = h.bundle_service.save(MediaBundle::new("video")).await.unwrap();

    assert_eq!(bundle.source_field(), Some("field_media_generic".to_string()));
    let storage = h.fields.load("media", "field_media_generic").await.unwrap().unwrap();
    assert_eq!(storage.field_type, FieldType::String);
    assert!(h.fields.instance_exists("video", "field_media_generic").await.unwrap());
    assert!(h.displays.is_attached("video", "field_media_generic").await);

    // The persisted record carries the resolved name too.
    let persisted = h.bundles.load("video").await.unwrap().unwrap();
    assert_eq!(persisted.source_field(), Some("field_media_generic".to_string()));
}

#[tokio::test]
async fn test_second_generic_bundle_gets_deduplicated_name() {
    // Scenario: bundles "a" then "b", both generic, no explicit source_field.
    let h = harness();
    let a = h.bundle_service.save(MediaBundle::new("a")).await.unwrap();
    let b = h.bundle_service.save(MediaBundle::new("b")).await.unwrap();

    assert_eq!(a.source_field(), Some("field_media_generic".to_string()));
    assert_eq!(b.source_field(), Some("field_media_generic_1".to_string()));
}

#[tokio::test]
async fn test_resolved_name_never_collides_with_existing_storage() {
    let h = harness();
    for name in ["field_media_generic", "field_media_generic_1"] {
        h.fields
            .seed_storage(FieldStorageDescriptor::new("media", name, FieldType::String))
            .await;
    }

    let bundle = h.bundle_service.save(MediaBundle::new("video")).await.unwrap();
    assert_eq!(bundle.source_field(), Some("field_media_generic_2".to_string()));
}

#[tokio::test]
async fn test_configured_source_field_is_reused_without_new_storage() {
    let h = harness();
    h.fields
        .seed_storage(FieldStorageDescriptor::new(
            "media",
            "field_media_generic",
            FieldType::String,
        ))
        .await;

    let mut bundle = MediaBundle::new("video");
    bundle.set_type_configuration(json!({"source_field": "field_media_generic"}));
    let bundle = h.bundle_service.save(bundle).await.unwrap();

    assert_eq!(bundle.source_field(), Some("field_media_generic".to_string()));
    assert_eq!(h.fields.storage_count("media").await, 1);
}

#[tokio::test]
async fn test_repeated_save_is_idempotent() {
    let h = harness();
    let bundle = h.bundle_service.save(MediaBundle::new("video")).await.unwrap();
    let again = h.bundle_service.save(bundle.clone()).await.unwrap();

    assert_eq!(bundle.source_field(), again.source_field());
    assert_eq!(h.fields.storage_count("media").await, 1);
}

#[tokio::test]
async fn test_unknown_provider_blocks_save() {
    let h = harness();
    let bundle = MediaBundle::new("holo").with_type_provider("hologram");
    let err = h.bundle_service.save(bundle).await.unwrap_err();

    assert!(matches!(err, MediaError::UnknownProvider { ref id } if id == "hologram"));
    assert!(h.bundles.load("holo").await.unwrap().is_none());
}

#[tokio::test]
async fn test_save_cache_tags_for_create_and_update() {
    let h = harness();
    let bundle = h.bundle_service.save(MediaBundle::new("video")).await.unwrap();
    h.bundle_service
        .save(bundle.with_label("Video library"))
        .await
        .unwrap();

    assert_eq!(
        h.cache.invalidated().await,
        vec!["media_bundles".to_string(), "media_bundle:video".to_string()]
    );
}

#[tokio::test]
async fn test_rename_updates_referencing_media_only() {
    let h = harness();
    h.bundle_service.save(MediaBundle::new("old")).await.unwrap();
    h.bundle_service.save(MediaBundle::new("pictures").with_type_provider("image")).await.unwrap();

    let mine = h.media_service.save(MediaItem::new("old")).await.unwrap();
    let other = h.media_service.save(MediaItem::new("pictures")).await.unwrap();

    h.bundle_service.rename("old", "new").await.unwrap();

    assert!(h.bundles.load("old").await.unwrap().is_none());
    assert!(h.bundles.load("new").await.unwrap().is_some());
    assert_eq!(h.media.load(mine.id).await.unwrap().unwrap().bundle, "new");
    assert_eq!(h.media.load(other.id).await.unwrap().unwrap().bundle, "pictures");
    for revision in h.media.revisions_for(mine.id).await {
        assert_eq!(revision.bundle, "new");
    }
}

#[tokio::test]
async fn test_rename_to_taken_id_is_refused() {
    let h = harness();
    h.bundle_service.save(MediaBundle::new("a")).await.unwrap();
    h.bundle_service.save(MediaBundle::new("b")).await.unwrap();

    let err = h.bundle_service.rename("a", "b").await.unwrap_err();
    assert!(matches!(err, MediaError::BundleExists(ref id) if id == "b"));
    assert!(h.bundles.load("a").await.unwrap().is_some());
}

#[tokio::test]
async fn test_delete_refused_while_in_use() {
    let h = harness();
    h.bundle_service.save(MediaBundle::new("video")).await.unwrap();
    let item = h.media_service.save(MediaItem::new("video")).await.unwrap();

    let err = h.bundle_service.delete("video").await.unwrap_err();
    assert!(matches!(err, MediaError::BundleInUse { count: 1, .. }));

    h.media_service.delete(&item).await.unwrap();
    h.bundle_service.delete("video").await.unwrap();
    assert!(h.bundles.load("video").await.unwrap().is_none());
}

#[tokio::test]
async fn test_media_name_synthesis() {
    // Scenario: save a media with bundle="video", name="".
    let h = harness();
    h.bundle_service.save(MediaBundle::new("video")).await.unwrap();

    let item = h.media_service.save(MediaItem::new("video")).await.unwrap();
    assert_eq!(item.name, format!("media:video:{}", item.id));

    let named = h
        .media_service
        .save(MediaItem::new("video").with_name("My clip"))
        .await
        .unwrap();
    assert_eq!(named.name, "My clip");
}

#[tokio::test]
async fn test_media_save_requires_existing_bundle() {
    let h = harness();
    let err = h.media_service.save(MediaItem::new("ghost")).await.unwrap_err();
    assert!(matches!(err, MediaError::BundleNotFound(ref id) if id == "ghost"));
}

#[tokio::test]
async fn test_field_map_populates_empty_destination() {
    let h = harness();
    let mut bundle = MediaBundle::new("galleries").with_type_provider("gallery");
    bundle.field_map.insert("title".to_string(), "field_title".to_string());
    h.bundle_service.save(bundle).await.unwrap();

    let item = h.media_service.save(MediaItem::new("galleries")).await.unwrap();
    assert_eq!(item.value("field_title"), Some(&json!("Gallery title")));
}

#[tokio::test]
async fn test_field_map_never_overwrites_existing_data() {
    let h = harness();
    let mut bundle = MediaBundle::new("galleries").with_type_provider("gallery");
    bundle.field_map.insert("title".to_string(), "field_title".to_string());
    h.bundle_service.save(bundle).await.unwrap();

    let item = h
        .media_service
        .save(MediaItem::new("galleries").with_value("field_title", json!("Keep Me")))
        .await
        .unwrap();
    assert_eq!(item.value("field_title"), Some(&json!("Keep Me")));
}

#[tokio::test]
async fn test_thumbnail_never_empty_for_any_provider() {
    let h = harness();
    for (id, provider_id) in [("v", "generic"), ("p", "image"), ("g", "gallery")] {
        h.bundle_service
            .save(MediaBundle::new(id).with_type_provider(provider_id))
            .await
            .unwrap();
        let item = h.media_service.save(MediaItem::new(id)).await.unwrap();
        let thumbnail = item.thumbnail_uri.expect("thumbnail always set");
        assert!(!thumbnail.is_empty(), "provider {provider_id} returned empty thumbnail");
    }
}

#[tokio::test]
async fn test_image_thumbnail_uses_source_value() {
    let h = harness();
    let bundle = h
        .bundle_service
        .save(MediaBundle::new("photos").with_type_provider("image"))
        .await
        .unwrap();
    let source_field = bundle.source_field().unwrap();

    let item = h
        .media_service
        .save(MediaItem::new("photos").with_value(
            source_field,
            json!({"uri": "public://photos/cat.jpg", "width": 800, "height": 600}),
        ))
        .await
        .unwrap();
    assert_eq!(item.thumbnail_uri.as_deref(), Some("public://photos/cat.jpg"));
}

#[tokio::test]
async fn test_queued_thumbnail_uses_fallback() {
    let h = harness();
    let mut bundle = MediaBundle::new("photos").with_type_provider("image");
    bundle.queue_thumbnail_downloads = true;
    let bundle = h.bundle_service.save(bundle).await.unwrap();
    let source_field = bundle.source_field().unwrap();

    let item = h
        .media_service
        .save(MediaItem::new("photos").with_value(source_field, json!({"uri": "public://photos/cat.jpg"})))
        .await
        .unwrap();
    assert_eq!(item.thumbnail_uri.as_deref(), Some("public://media-icons/image.png"));
}

#[tokio::test]
async fn test_media_defaults_follow_bundle_status() {
    let h = harness();
    h.bundle_service.save(MediaBundle::new("published")).await.unwrap();
    let mut drafts = MediaBundle::new("drafts");
    drafts.status = false;
    h.bundle_service.save(drafts).await.unwrap();

    let published = h.media_service.save(MediaItem::new("published")).await.unwrap();
    let draft = h.media_service.save(MediaItem::new("drafts")).await.unwrap();
    assert!(published.published);
    assert!(!draft.published);
}

#[tokio::test]
async fn test_media_bundle_reference_is_immutable() {
    let h = harness();
    h.bundle_service.save(MediaBundle::new("a")).await.unwrap();
    h.bundle_service.save(MediaBundle::new("b")).await.unwrap();

    let mut item = h.media_service.save(MediaItem::new("a")).await.unwrap();
    item.bundle = "b".to_string();
    let err = h.media_service.save(item).await.unwrap_err();
    assert!(matches!(err, MediaError::ImmutableBundleReference { .. }));
}

#[tokio::test]
async fn test_revision_bookkeeping() {
    let h = harness();
    let mut bundle = MediaBundle::new("video");
    bundle.new_revision = true;
    h.bundle_service.save(bundle).await.unwrap();

    let first = h.media_service.save(MediaItem::new("video")).await.unwrap();
    assert_eq!(first.revision_id, 1);

    let second = h.media_service.save(first.clone()).await.unwrap();
    assert_eq!(second.revision_id, 2);
    assert_eq!(second.created_at, first.created_at);
}

#[tokio::test]
async fn test_plain_update_preserves_revision_log() {
    let h = harness();
    h.bundle_service.save(MediaBundle::new("video")).await.unwrap();

    let mut item = h.media_service.save(MediaItem::new("video")).await.unwrap();
    item.revision_log_message = Some("initial import".to_string());
    let item = h.media_service.save(item).await.unwrap();

    let mut update = item.clone();
    update.revision_log_message = None;
    let updated = h.media_service.save(update).await.unwrap();

    assert_eq!(updated.revision_id, item.revision_id);
    assert_eq!(updated.revision_log_message.as_deref(), Some("initial import"));
}

#[tokio::test]
async fn test_provider_validation_rejects_media() {
    let h = harness();
    h.bundle_service
        .save(MediaBundle::new("vault").with_type_provider("strict"))
        .await
        .unwrap();

    let err = h.media_service.save(MediaItem::new("vault")).await.unwrap_err();
    assert!(matches!(err, MediaError::Validation(_)));
    assert_eq!(h.media.count_by_bundle("vault").await.unwrap(), 0);
}

#[tokio::test]
async fn test_repeated_save_memoizes_provider_construction() {
    let factory = Arc::new(TestProviderFactory::new("docs"));
    let registry = TypeProviderRegistry::new();
    registry.register(factory.clone());

    let fields = InMemoryFieldStorageRepository::new();
    let bundles = InMemoryBundleRepository::new();
    let media = InMemoryMediaRepository::new();
    let resolver = SourceFieldResolver::new(
        Arc::new(fields.clone()),
        Arc::new(InMemoryDisplayRepository::new()),
    );
    let coordinator = BundleLifecycleCoordinator::new(
        Arc::new(media.clone()),
        Arc::new(InMemoryCacheInvalidator::new()),
        Arc::new(NoOpBundleEventListener),
    );
    let service = BundleService::new(
        registry,
        Arc::new(bundles.clone()),
        Arc::new(media),
        resolver,
        coordinator,
    );

    let saved = service
        .save(MediaBundle::new("manuals").with_type_provider("docs"))
        .await
        .unwrap();
    // The first save rewrote the configuration (source field write-back),
    // so the second save rebuilds once; after that the configuration is
    // stable and the cached instance is reused.
    let saved = service.save(saved).await.unwrap();
    service.save(saved).await.unwrap();

    assert_eq!(factory.instantiation_count(), 2);
}

#[tokio::test]
async fn test_revision_author_defaults_to_publisher() {
    let h = harness();
    h.bundle_service.save(MediaBundle::new("video")).await.unwrap();

    let publisher = uuid::Uuid::new_v4();
    let item = h
        .media_service
        .save(MediaItem::new("video").with_publisher(publisher))
        .await
        .unwrap();
    assert_eq!(item.revision_author_id, Some(publisher));
}
