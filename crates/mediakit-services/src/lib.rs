//! Mediakit Services
//!
//! Bundle and media pipelines built over the store collaborators: source
//! field resolution and creation, bundle lifecycle coordination (create,
//! rename, update, delete), and the save entry points for bundles and
//! media records.

pub mod bundle_service;
pub mod lifecycle;
pub mod media_service;
pub mod source_field;

pub use bundle_service::BundleService;
pub use lifecycle::{BundleEventListener, BundleLifecycleCoordinator, NoOpBundleEventListener};
pub use media_service::MediaService;
pub use source_field::SourceFieldResolver;
