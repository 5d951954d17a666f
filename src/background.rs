/// Background service: owns the extension config and the managed tab, and
/// answers every `Request` sent by the content script and the popup
use crate::config::{CONFIG_STORAGE_KEY, ExtensionConfig};
use crate::link::Link;
use crate::messages::{Request, Response};
use crate::navigation::{TabApi, TabManager};
use crate::store::{HealthCheck, LinkStore, SettingsStore};

/// `chrome.runtime.onInstalled` reason for a fresh install
pub const INSTALL_REASON: &str = "install";

pub const WELCOME_TITLE: &str = "TV Box Toolbar Installed";
pub const WELCOME_MESSAGE: &str = "Hover near the left edge of any webpage to access your links!";

/// Persistence for the single `ExtensionConfig` record
#[allow(async_fn_in_trait)]
pub trait ConfigStorage {
    async fn load(&self) -> Result<Option<ExtensionConfig>, String>;
    async fn save(&self, config: &ExtensionConfig) -> Result<(), String>;
}

/// chrome.storage.local under `tvboxConfig`
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeConfigStorage;

impl ConfigStorage for ChromeConfigStorage {
    async fn load(&self) -> Result<Option<ExtensionConfig>, String> {
        crate::bridge::storage_get(CONFIG_STORAGE_KEY).await
    }

    async fn save(&self, config: &ExtensionConfig) -> Result<(), String> {
        crate::bridge::storage_set(CONFIG_STORAGE_KEY, config).await
    }
}

/// Read the stored config, falling back to defaults when missing or unreadable
pub async fn load_config<C: ConfigStorage>(storage: &C) -> ExtensionConfig {
    match storage.load().await {
        Ok(Some(config)) => config,
        Ok(None) => ExtensionConfig::default(),
        Err(e) => {
            log::warn!("Could not load config, using defaults: {}", e);
            ExtensionConfig::default()
        }
    }
}

pub struct BackgroundService<C, T, F>
where
    T: TabApi,
{
    config: C,
    tabs: TabManager<T>,
    connect: F,
}

impl<C, T, F, S> BackgroundService<C, T, F>
where
    C: ConfigStorage,
    T: TabApi,
    F: Fn(&str) -> S,
    S: LinkStore + SettingsStore + HealthCheck,
{
    /// `connect` builds an API client for a server URL
    pub fn new(config: C, tabs: TabManager<T>, connect: F) -> Self {
        BackgroundService {
            config,
            tabs,
            connect,
        }
    }

    pub fn tabs(&self) -> &TabManager<T> {
        &self.tabs
    }

    pub fn config_storage(&self) -> &C {
        &self.config
    }

    pub async fn handle(&self, request: Request) -> Response {
        log::debug!("Handling {}", request.kind());

        match request {
            Request::GetConfig => Response::Config(load_config(&self.config).await),

            Request::SetConfig { config } => match self.config.save(&config).await {
                Ok(()) => Response::Saved,
                Err(e) => Response::failed(e),
            },

            Request::TestConnection { server_url } => {
                match (self.connect)(&server_url).health().await {
                    Ok(health) => Response::Health(health),
                    Err(e) => Response::failed(e),
                }
            }

            Request::FetchLinks { server_url } => match (self.connect)(&server_url).list().await {
                Ok(links) => Response::Links(links),
                Err(e) => Response::failed(format!("Failed to fetch links: {}", e)),
            },

            Request::AddWebsite {
                server_url,
                website_data,
            } => {
                let draft = match website_data.validate() {
                    Ok(draft) => draft,
                    Err(e) => return Response::failed(e),
                };
                match (self.connect)(&server_url).create(&draft).await {
                    Ok(link) => Response::LinkAdded(link),
                    Err(e) => Response::failed(e),
                }
            }

            Request::OpenUrl { url } => match self.tabs.open_url(&url).await {
                Ok(action) => Response::Opened { action },
                Err(e) => Response::failed(e),
            },

            Request::GetSetting { server_url, key } => {
                match (self.connect)(&server_url).get_setting(key).await {
                    Ok(value) => Response::Setting { value },
                    Err(e) => Response::failed(e),
                }
            }
        }
    }

    /// First install writes the default config; updates keep what is stored.
    /// Returns whether defaults were written.
    pub async fn installed(&self, reason: &str) -> Result<bool, String> {
        if reason != INSTALL_REASON {
            log::debug!("Extension {}, keeping stored config", reason);
            return Ok(false);
        }

        self.config.save(&ExtensionConfig::default()).await?;
        log::info!("Installed with default config");
        Ok(true)
    }

    /// Badge reflecting the stored enabled flag
    pub async fn badge(&self) -> (&'static str, &'static str) {
        load_config(&self.config).await.badge()
    }
}

/// Whether `url` is already saved, compared exactly
pub fn contains_url(links: &[Link], url: &str) -> bool {
    links.iter().any(|link| link.url == url)
}
