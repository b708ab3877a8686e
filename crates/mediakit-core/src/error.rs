//! Error types module
//!
//! All failures surfaced by the bundle and media pipelines are unified under
//! the `MediaError` enum. Errors always propagate to the immediate caller;
//! nothing is swallowed. Routine "no value available" conditions (unknown
//! provided-field keys, thumbnail fallback) are modeled as sentinel returns
//! on the provider contract, not as errors.

use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// The bundle references a type provider id that is not registered.
    /// Non-recoverable until the bundle configuration is corrected.
    #[error("unknown media type provider '{id}'")]
    UnknownProvider { id: String },

    /// Field storage or field instance creation failed. Aborts the
    /// enclosing bundle save; no partial state is committed.
    #[error("source field creation failed: {0}")]
    FieldCreation(String),

    /// Delete was refused because media records still reference the bundle.
    #[error("media bundle '{id}' is still referenced by {count} media item(s)")]
    BundleInUse { id: String, count: u64 },

    /// Rewriting media bundle references during a rename failed partway.
    /// Fatal: the bundle id change must not be considered committed.
    #[error("rename propagation from '{old_id}' to '{new_id}' failed: {reason}")]
    RenamePropagation {
        old_id: String,
        new_id: String,
        reason: String,
    },

    #[error("media bundle '{0}' not found")]
    BundleNotFound(String),

    #[error("media bundle '{0}' already exists")]
    BundleExists(String),

    #[error("media item '{0}' not found")]
    MediaNotFound(Uuid),

    /// A media record's bundle reference is immutable once persisted.
    #[error("media item '{media_id}' cannot move from bundle '{from}' to '{to}'")]
    ImmutableBundleReference {
        media_id: Uuid,
        from: String,
        to: String,
    },

    /// Provider-specific validation rejected the media record.
    #[error("media validation failed: {0}")]
    Validation(String),

    /// Failure reported by a persistence or cache collaborator.
    #[error("store error: {0}")]
    Store(String),
}

impl MediaError {
    /// Variant name for structured log fields.
    pub fn error_type(&self) -> &'static str {
        match self {
            MediaError::UnknownProvider { .. } => "UnknownProvider",
            MediaError::FieldCreation(_) => "FieldCreation",
            MediaError::BundleInUse { .. } => "BundleInUse",
            MediaError::RenamePropagation { .. } => "RenamePropagation",
            MediaError::BundleNotFound(_) => "BundleNotFound",
            MediaError::BundleExists(_) => "BundleExists",
            MediaError::MediaNotFound(_) => "MediaNotFound",
            MediaError::ImmutableBundleReference { .. } => "ImmutableBundleReference",
            MediaError::Validation(_) => "Validation",
            MediaError::Store(_) => "Store",
        }
    }

    /// Whether retrying the same operation can succeed without operator
    /// intervention. Collaborator failures may be transient; configuration
    /// errors are not.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MediaError::Store(_) | MediaError::FieldCreation(_) | MediaError::RenamePropagation { .. }
        )
    }
}
