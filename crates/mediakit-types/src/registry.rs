//! Registry of type-provider factories.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::Value as JsonValue;

use mediakit_core::{MediaBundle, MediaError};

use crate::provider::{ProviderDefinition, TypeProvider, TypeProviderFactory};

/// Catalog of available type-provider variants.
///
/// Populated once at process start and read-mostly afterwards. Definition
/// listing preserves registration order, stable and repeatable. Cloning
/// shares the underlying catalog.
#[derive(Clone, Default)]
pub struct TypeProviderRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

#[derive(Default)]
struct RegistryInner {
    factories: HashMap<String, Arc<dyn TypeProviderFactory>>,
    order: Vec<String>,
}

impl TypeProviderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider factory. Re-registering an id replaces the
    /// earlier factory but keeps its position in the listing order.
    pub fn register(&self, factory: Arc<dyn TypeProviderFactory>) {
        let id = factory.definition().id;
        let mut inner = self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        if inner.factories.insert(id.clone(), factory).is_none() {
            inner.order.push(id);
        }
    }

    /// All registered definitions, in registration order.
    pub fn definitions(&self) -> Vec<ProviderDefinition> {
        let inner = self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        inner
            .order
            .iter()
            .filter_map(|id| inner.factories.get(id))
            .map(|factory| factory.definition())
            .collect()
    }

    /// Look up one definition by id.
    pub fn definition(&self, id: &str) -> Result<ProviderDefinition, MediaError> {
        let inner = self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        inner
            .factories
            .get(id)
            .map(|factory| factory.definition())
            .ok_or_else(|| MediaError::UnknownProvider { id: id.to_string() })
    }

    /// Whether a provider id is registered.
    pub fn contains(&self, id: &str) -> bool {
        let inner = self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        inner.factories.contains_key(id)
    }

    /// Construct a configured provider instance.
    pub fn instantiate(
        &self,
        id: &str,
        configuration: JsonValue,
    ) -> Result<Arc<dyn TypeProvider>, MediaError> {
        let factory = {
            let inner = self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner());
            inner
                .factories
                .get(id)
                .cloned()
                .ok_or_else(|| MediaError::UnknownProvider { id: id.to_string() })?
        };
        Ok(factory.create(configuration))
    }

    /// Construct the provider instance a bundle's configuration selects.
    pub fn provider_for(&self, bundle: &MediaBundle) -> Result<Arc<dyn TypeProvider>, MediaError> {
        self.instantiate(&bundle.type_provider, bundle.type_configuration.clone())
    }
}
