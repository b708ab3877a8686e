pub mod bundle;
pub mod media;

pub use bundle::MediaBundle;
pub use media::MediaItem;
