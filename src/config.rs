/// Extension configuration persisted in chrome.storage.local
use serde::{Deserialize, Serialize};
use url::Url;

/// Storage key holding the whole `ExtensionConfig` record
pub const CONFIG_STORAGE_KEY: &str = "tvboxConfig";

pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_server_url")]
    pub server_url: String,
}

fn default_enabled() -> bool {
    true
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

impl ExtensionConfig {
    pub fn new(enabled: bool, server_url: &str) -> Self {
        ExtensionConfig {
            enabled,
            server_url: server_url.to_string(),
        }
    }

    /// Build a config from popup input.
    ///
    /// Trailing slashes are removed, an empty URL means the default server,
    /// and anything that is not an absolute URL is rejected.
    pub fn from_input(enabled: bool, server_url: &str) -> Result<Self, String> {
        let server_url = normalize_server_url(server_url);
        Url::parse(&server_url).map_err(|_| "Invalid server URL format".to_string())?;

        Ok(ExtensionConfig::new(enabled, &server_url))
    }

    pub fn toggled(&self) -> Self {
        ExtensionConfig {
            enabled: !self.enabled,
            ..self.clone()
        }
    }

    /// Badge text and colour reflecting the enabled state
    pub fn badge(&self) -> (&'static str, &'static str) {
        if self.enabled {
            ("", "#6366f1")
        } else {
            ("OFF", "#64748b")
        }
    }
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        ExtensionConfig::new(default_enabled(), DEFAULT_SERVER_URL)
    }
}

pub fn normalize_server_url(input: &str) -> String {
    let trimmed = input.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        DEFAULT_SERVER_URL.to_string()
    } else {
        trimmed.to_string()
    }
}
