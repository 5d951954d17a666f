/// Clients for the links, settings and health endpoints
use serde::{Deserialize, Serialize};

use crate::bridge::{self, HttpResponse};
use crate::error::{ApiError, Result};
use crate::link::{Link, LinkDraft};

/// Settings the UI reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingKey {
    SearchEngineUrl,
    AccentColor,
    BackgroundTheme,
}

impl SettingKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::SearchEngineUrl => "search_engine_url",
            SettingKey::AccentColor => "accent_color",
            SettingKey::BackgroundTheme => "background_theme",
        }
    }
}

/// Reply of `GET /api/extension/health`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthStatus {
    #[serde(default = "default_health_status")]
    pub status: String,
    #[serde(default = "default_health_version")]
    pub version: String,
}

fn default_health_status() -> String {
    "healthy".to_string()
}

fn default_health_version() -> String {
    "1.0".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
struct SettingValue {
    #[serde(default)]
    value: Option<String>,
}

#[allow(async_fn_in_trait)]
pub trait LinkStore {
    async fn list(&self) -> Result<Vec<Link>>;
    async fn create(&self, draft: &LinkDraft) -> Result<Link>;
    async fn update(&self, id: i64, draft: &LinkDraft) -> Result<Link>;
    async fn delete(&self, id: i64) -> Result<()>;
}

#[allow(async_fn_in_trait)]
pub trait HealthCheck {
    async fn health(&self) -> Result<HealthStatus>;
}

#[allow(async_fn_in_trait)]
pub trait SettingsStore {
    /// `Ok(None)` when the setting has never been saved
    async fn get_setting(&self, key: SettingKey) -> Result<Option<String>>;
    async fn put_setting(&self, key: SettingKey, value: &str) -> Result<()>;
}

/// HTTP client for one server. An empty base URL means "same origin".
#[derive(Debug, Clone, PartialEq)]
pub struct HttpStore {
    base_url: String,
}

impl HttpStore {
    pub fn new(base_url: &str) -> HttpStore {
        HttpStore {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn same_origin() -> HttpStore {
        HttpStore::new("")
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, method: &str, path: &str, body: Option<String>) -> Result<HttpResponse> {
        let url = self.endpoint(path);
        log::debug!("{} {}", method, url);

        let response = bridge::http_request(method, &url, body).await?;
        if response.is_success() {
            Ok(response)
        } else {
            log::warn!("{} {} returned {}", method, url, response.status);
            Err(ApiError::from_response(response.status, &response.body))
        }
    }

    fn encode<T: Serialize>(value: &T) -> Result<String> {
        serde_json::to_string(value).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

impl HealthCheck for HttpStore {
    async fn health(&self) -> Result<HealthStatus> {
        self.send("GET", "/api/extension/health", None).await?.json()
    }
}

impl LinkStore for HttpStore {
    async fn list(&self) -> Result<Vec<Link>> {
        self.send("GET", "/api/links", None).await?.json()
    }

    async fn create(&self, draft: &LinkDraft) -> Result<Link> {
        let body = Self::encode(draft)?;
        self.send("POST", "/api/links", Some(body)).await?.json()
    }

    async fn update(&self, id: i64, draft: &LinkDraft) -> Result<Link> {
        let body = Self::encode(draft)?;
        self.send("PUT", &format!("/api/links/{}", id), Some(body))
            .await?
            .json()
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.send("DELETE", &format!("/api/links/{}", id), None)
            .await
            .map(|_| ())
    }
}

impl SettingsStore for HttpStore {
    async fn get_setting(&self, key: SettingKey) -> Result<Option<String>> {
        let path = format!("/api/settings/{}", key.as_str());
        match self.send("GET", &path, None).await {
            Ok(response) => Ok(response.json::<SettingValue>()?.value),
            Err(ApiError::Server { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn put_setting(&self, key: SettingKey, value: &str) -> Result<()> {
        let body = Self::encode(&SettingValue {
            value: Some(value.to_string()),
        })?;
        self.send("PUT", &format!("/api/settings/{}", key.as_str()), Some(body))
            .await
            .map(|_| ())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setting_key_names() {
        assert_eq!(SettingKey::SearchEngineUrl.as_str(), "search_engine_url");
        assert_eq!(SettingKey::AccentColor.as_str(), "accent_color");
        assert_eq!(SettingKey::BackgroundTheme.as_str(), "background_theme");
        assert_eq!(
            serde_json::to_string(&SettingKey::BackgroundTheme).unwrap(),
            "\"background_theme\""
        );
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let store = HttpStore::new("http://localhost:5000///");
        assert_eq!(store.endpoint("/api/links"), "http://localhost:5000/api/links");
        assert_eq!(HttpStore::same_origin().endpoint("/api/links"), "/api/links");
    }

    #[test]
    fn test_health_defaults() {
        let health: HealthStatus = serde_json::from_str("{}").unwrap();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.version, "1.0");

        let health: HealthStatus =
            serde_json::from_str(r#"{"status": "healthy", "server": "tv-box", "version": "2.1"}"#).unwrap();
        assert_eq!(health.version, "2.1");
    }

    #[test]
    fn test_setting_value_body() {
        let body = serde_json::to_string(&SettingValue {
            value: Some("#6366f1".to_string()),
        })
        .unwrap();
        assert_eq!(body, r##"{"value":"#6366f1"}"##);

        let missing: SettingValue = serde_json::from_str(r#"{"value": null}"#).unwrap();
        assert_eq!(missing.value, None);
    }
}
