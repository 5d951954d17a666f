/// Messages exchanged between the content script / popup and the background service
use serde::{Deserialize, Serialize};

use crate::config::ExtensionConfig;
use crate::error::{ApiError, Result as ApiResult};
use crate::link::{Link, LinkDraft};
use crate::navigation::OpenAction;
use crate::store::{HealthStatus, SettingKey, SettingsStore};

/// One request kind per variant, each carrying exactly what it needs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Request {
    GetConfig,
    SetConfig { config: ExtensionConfig },
    TestConnection { server_url: String },
    FetchLinks { server_url: String },
    AddWebsite { server_url: String, website_data: LinkDraft },
    OpenUrl { url: String },
    GetSetting { server_url: String, key: SettingKey },
}

impl Request {
    pub fn kind(&self) -> &'static str {
        match self {
            Request::GetConfig => "getConfig",
            Request::SetConfig { .. } => "setConfig",
            Request::TestConnection { .. } => "testConnection",
            Request::FetchLinks { .. } => "fetchLinks",
            Request::AddWebsite { .. } => "addWebsite",
            Request::OpenUrl { .. } => "openUrl",
            Request::GetSetting { .. } => "getSetting",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum Response {
    Config(ExtensionConfig),
    Saved,
    Health(HealthStatus),
    Links(Vec<Link>),
    LinkAdded(Link),
    Opened { action: OpenAction },
    Setting { value: Option<String> },
    Failed { error: String },
}

impl Response {
    pub fn failed(error: impl ToString) -> Response {
        Response::Failed {
            error: error.to_string(),
        }
    }

    fn unexpected(self, expected: &str) -> String {
        match self {
            Response::Failed { error } => error,
            other => format!("Unexpected response to {}: {:?}", expected, other),
        }
    }

    pub fn into_config(self) -> Result<ExtensionConfig, String> {
        match self {
            Response::Config(config) => Ok(config),
            other => Err(other.unexpected("getConfig")),
        }
    }

    pub fn into_saved(self) -> Result<(), String> {
        match self {
            Response::Saved => Ok(()),
            other => Err(other.unexpected("setConfig")),
        }
    }

    pub fn into_health(self) -> Result<HealthStatus, String> {
        match self {
            Response::Health(health) => Ok(health),
            other => Err(other.unexpected("testConnection")),
        }
    }

    pub fn into_links(self) -> Result<Vec<Link>, String> {
        match self {
            Response::Links(links) => Ok(links),
            other => Err(other.unexpected("fetchLinks")),
        }
    }

    pub fn into_link_added(self) -> Result<Link, String> {
        match self {
            Response::LinkAdded(link) => Ok(link),
            other => Err(other.unexpected("addWebsite")),
        }
    }

    pub fn into_opened(self) -> Result<OpenAction, String> {
        match self {
            Response::Opened { action } => Ok(action),
            other => Err(other.unexpected("openUrl")),
        }
    }

    pub fn into_setting(self) -> Result<Option<String>, String> {
        match self {
            Response::Setting { value } => Ok(value),
            other => Err(other.unexpected("getSetting")),
        }
    }
}

/// Send a request to the background service
pub async fn send(request: &Request) -> Result<Response, String> {
    log::debug!("Sending {}", request.kind());
    crate::bridge::send_message(request).await
}

/// Settings read through the background service, for pages that cannot
/// reach the server directly
pub struct BackgroundSettings {
    server_url: String,
}

impl BackgroundSettings {
    pub fn new(server_url: &str) -> BackgroundSettings {
        BackgroundSettings {
            server_url: server_url.to_string(),
        }
    }
}

impl SettingsStore for BackgroundSettings {
    async fn get_setting(&self, key: SettingKey) -> ApiResult<Option<String>> {
        let request = Request::GetSetting {
            server_url: self.server_url.clone(),
            key,
        };
        send(&request)
            .await
            .and_then(Response::into_setting)
            .map_err(ApiError::Transport)
    }

    async fn put_setting(&self, key: SettingKey, _value: &str) -> ApiResult<()> {
        Err(ApiError::Validation(format!("{} is read-only here", key.as_str())))
    }
}
