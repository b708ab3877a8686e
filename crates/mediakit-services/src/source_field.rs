//! Source field resolution and creation.
//!
//! Guarantees that a bundle's provider has a concrete source field:
//! reusing an explicitly configured field when its storage already exists,
//! otherwise probing `field_media_<plugin_id>`, `_1`, `_2`, ... for a
//! collision-free name. Storage creation races between concurrent saves of
//! different bundles are possible; the storage engine's uniqueness
//! constraint rejects the loser, which retries resolution from scratch.

use std::sync::Arc;

use tracing::{debug, info, warn};

use mediakit_core::{MediaBundle, MediaError, MEDIA_ENTITY_TYPE};
use mediakit_store::{DisplayRepository, FieldStorageRepository};
use mediakit_types::provider::source_field_base_name;
use mediakit_types::TypeProvider;

pub struct SourceFieldResolver {
    fields: Arc<dyn FieldStorageRepository>,
    displays: Arc<dyn DisplayRepository>,
}

impl SourceFieldResolver {
    pub fn new(fields: Arc<dyn FieldStorageRepository>, displays: Arc<dyn DisplayRepository>) -> Self {
        Self { fields, displays }
    }

    /// Determine the source field name for a bundle.
    ///
    /// Idempotent: with no configuration mutation in between, two calls
    /// return the same name. The returned name is not guaranteed to have a
    /// persisted storage yet; [`SourceFieldResolver::ensure_source_field`]
    /// covers creation.
    pub async fn resolve_field_name(
        &self,
        bundle: &MediaBundle,
        provider: &dyn TypeProvider,
    ) -> Result<String, MediaError> {
        if let Some(configured) = bundle.source_field() {
            if let Some(storage) = self.fields.load(MEDIA_ENTITY_TYPE, &configured).await? {
                // Reuse as configured. The storage type is deliberately not
                // re-validated against the provider's allowed set; an
                // explicit override is trusted, but a mismatch is logged.
                if !provider.allowed_field_types().contains(&storage.field_type) {
                    warn!(
                        bundle = %bundle.id,
                        field = %configured,
                        field_type = ?storage.field_type,
                        provider = provider.plugin_id(),
                        "reusing source field whose storage type is outside the provider's allowed set"
                    );
                }
                return Ok(configured);
            }
        }

        let existing = self.fields.definitions(MEDIA_ENTITY_TYPE).await?;
        let base = source_field_base_name(provider.plugin_id());
        if !existing.contains_key(&base) {
            return Ok(base);
        }
        let mut suffix = 1u32;
        loop {
            let candidate = format!("{base}_{suffix}");
            if !existing.contains_key(&candidate) {
                return Ok(candidate);
            }
            suffix += 1;
        }
    }

    /// Pre-persistence step of a bundle save: make sure a storage exists
    /// for the resolved name and record the name in the bundle's
    /// configuration so it is persisted in the same transaction.
    pub async fn ensure_source_field(
        &self,
        bundle: &mut MediaBundle,
        provider: &dyn TypeProvider,
    ) -> Result<String, MediaError> {
        let name = self.resolve_field_name(bundle, provider).await?;

        if !self.fields.exists(MEDIA_ENTITY_TYPE, &name).await? {
            let mut storage = provider.create_source_field_storage();
            storage.name = name.clone();
            self.fields.create(storage).await?;
            info!(bundle = %bundle.id, field = %name, "created source field storage");
        } else {
            debug!(bundle = %bundle.id, field = %name, "reusing existing source field storage");
        }

        bundle.set_source_field(&name);
        Ok(name)
    }

    /// Post-persistence step of a bundle save: attach the bundle-specific
    /// field instance and its default form/view displays when missing.
    pub async fn ensure_source_field_instance(
        &self,
        bundle: &MediaBundle,
        provider: &dyn TypeProvider,
    ) -> Result<(), MediaError> {
        let name = bundle.source_field().ok_or_else(|| {
            MediaError::FieldCreation(format!(
                "bundle '{}' has no resolved source field",
                bundle.id
            ))
        })?;

        if self.fields.instance_exists(&bundle.id, &name).await? {
            return Ok(());
        }

        let field = provider.create_source_field_definition(bundle, &name);
        self.fields.create_instance(field.clone()).await?;
        self.displays.attach_to_displays(&bundle.id, &field).await?;
        info!(bundle = %bundle.id, field = %name, "attached source field instance");
        Ok(())
    }
}
