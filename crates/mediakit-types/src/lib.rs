//! Mediakit Types
//!
//! This crate provides the type-provider plugin system: the `TypeProvider`
//! contract each media kind implements, the factory/registry used to look
//! providers up by id, and the built-in `generic` and `image` providers.
//! Provider implementations stay separate from the bundle and media
//! pipelines, which only see the trait.

pub mod fields;
pub mod generic;
pub mod image;
pub mod provider;
pub mod registry;

// Re-export commonly used types
pub use fields::{FieldDescriptor, FieldStorageDescriptor, FieldType};
pub use generic::{GenericProvider, GenericProviderFactory};
pub use image::{ImageProvider, ImageProviderFactory};
pub use provider::{ProviderCell, ProviderDefinition, TypeProvider, TypeProviderFactory};
pub use registry::TypeProviderRegistry;

pub mod test_helpers;
