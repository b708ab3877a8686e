//! Configuration module
//!
//! Runtime settings for the media subsystem, loaded from the environment
//! with sensible defaults. Type providers use `icon_base_path` to build
//! default thumbnail URIs when no type-specific thumbnail can be computed.

use std::env;

const DEFAULT_ICON_BASE: &str = "public://media-icons";

/// Settings shared by the media subsystem.
#[derive(Clone, Debug)]
pub struct MediaSettings {
    /// Base URI under which the bundled fallback icons live.
    pub icon_base_path: String,
}

impl MediaSettings {
    /// Load settings from the environment (`MEDIAKIT_ICON_BASE`).
    /// A `.env` file is honored when present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            icon_base_path: env::var("MEDIAKIT_ICON_BASE")
                .unwrap_or_else(|_| DEFAULT_ICON_BASE.to_string()),
        }
    }

    /// URI of a named icon under the configured icon base.
    pub fn icon_uri(&self, file_name: &str) -> String {
        format!("{}/{}", self.icon_base_path.trim_end_matches('/'), file_name)
    }
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            icon_base_path: DEFAULT_ICON_BASE.to_string(),
        }
    }
}
