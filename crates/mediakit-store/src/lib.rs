//! Mediakit Store
//!
//! Trait abstractions for the persistence collaborators the bundle and
//! media pipelines depend on: field storage, bundle and media records,
//! cache invalidation, and display attachment. The traits define the
//! minimal interface the pipelines need, allowing embedders to plug in
//! their own engine and tests to run against the in-memory
//! implementations in [`memory`].

pub mod memory;
pub mod traits;

pub use memory::{
    InMemoryBundleRepository, InMemoryCacheInvalidator, InMemoryDisplayRepository,
    InMemoryFieldStorageRepository, InMemoryMediaRepository,
};
pub use traits::{
    bundle_list_tag, bundle_tag, BundleRepository, CacheInvalidator, DisplayRepository,
    FieldStorageRepository, MediaRepository,
};
