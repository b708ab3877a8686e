//! Mediakit Core Library
//!
//! This crate provides the domain models, error types, configuration, and
//! shared utilities used by all Mediakit components: the `MediaBundle`
//! configuration aggregate, the `MediaItem` content record, and the
//! deep-merge helper used for type-provider configuration.

pub mod config;
pub mod error;
pub mod merge;
pub mod models;

// Re-export commonly used types
pub use config::MediaSettings;
pub use error::MediaError;
pub use models::{MediaBundle, MediaItem};

/// Entity type identifier shared by field storages and media records.
pub const MEDIA_ENTITY_TYPE: &str = "media";
