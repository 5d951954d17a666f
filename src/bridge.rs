/// Typed wrappers around the JS bridge modules
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::error::{ApiError, Result};

#[wasm_bindgen(module = "/js/http.js")]
extern "C" {
    #[wasm_bindgen(catch, js_name = httpRequest)]
    async fn js_http_request(method: &str, url: &str, body: Option<String>) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_name = fetchText)]
    async fn js_fetch_text(url: &str) -> Result<JsValue, JsValue>;
}

#[wasm_bindgen(module = "/js/chrome.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getStorage(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(key: &str, value: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn sendMessage(message: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn queryActiveTab() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn createTab(url: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn updateTab(tab_id: i32, url: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn removeTab(tab_id: i32) -> Result<(), JsValue>;

    #[wasm_bindgen(js_name = setBadge)]
    pub fn set_badge(text: &str, color: &str);

    #[wasm_bindgen(js_name = onMessage)]
    pub fn on_message(handler: &js_sys::Function);

    #[wasm_bindgen(js_name = onTabCreated)]
    pub fn on_tab_created(callback: &js_sys::Function);

    #[wasm_bindgen(js_name = onTabRemoved)]
    pub fn on_tab_removed(callback: &js_sys::Function);

    #[wasm_bindgen(js_name = onStorageChanged)]
    pub fn on_storage_changed(key: &str, callback: &js_sys::Function);

    #[wasm_bindgen(js_name = onInstalled)]
    pub fn on_installed(callback: &js_sys::Function);

    #[wasm_bindgen(js_name = showNotification)]
    pub fn show_notification(title: &str, message: &str);
}

/// Status and raw body of a completed HTTP exchange
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Best effort human readable text for a thrown JS value
pub fn js_error_message(error: &JsValue) -> String {
    if let Some(text) = error.as_string() {
        return text;
    }
    match error.dyn_ref::<js_sys::Error>() {
        Some(e) => String::from(e.message()),
        None => format!("{:?}", error),
    }
}

pub async fn http_request(method: &str, url: &str, body: Option<String>) -> Result<HttpResponse> {
    let response = js_http_request(method, url, body)
        .await
        .map_err(|e| ApiError::Transport(js_error_message(&e)))?;

    serde_wasm_bindgen::from_value(response).map_err(|e| ApiError::Decode(e.to_string()))
}

pub async fn fetch_text(url: &str) -> Result<String, String> {
    let text = js_fetch_text(url)
        .await
        .map_err(|e| format!("Failed to fetch {}: {}", url, js_error_message(&e)))?;

    text.as_string()
        .ok_or_else(|| format!("Failed to fetch {}: response is not text", url))
}

/// Read one key from `chrome.storage.local`; `None` when the key is unset
pub async fn storage_get<T: DeserializeOwned>(key: &str) -> Result<Option<T>, String> {
    let value = getStorage(key)
        .await
        .map_err(|e| format!("Failed to get storage: {}", js_error_message(&e)))?;

    if value.is_null() || value.is_undefined() {
        return Ok(None);
    }

    serde_wasm_bindgen::from_value(value)
        .map(Some)
        .map_err(|e| format!("Failed to parse storage: {:?}", e))
}

pub async fn storage_set<T: Serialize>(key: &str, value: &T) -> Result<(), String> {
    let value = serde_wasm_bindgen::to_value(value)
        .map_err(|e| format!("Failed to serialize storage: {:?}", e))?;

    setStorage(key, value)
        .await
        .map_err(|e| format!("Failed to save storage: {}", js_error_message(&e)))
}

/// Send one message to the background service and decode its reply
pub async fn send_message<Req: Serialize, Resp: DeserializeOwned>(message: &Req) -> Result<Resp, String> {
    let message = serde_wasm_bindgen::to_value(message)
        .map_err(|e| format!("Failed to serialize message: {:?}", e))?;

    let response = sendMessage(message)
        .await
        .map_err(|e| js_error_message(&e))?;

    serde_wasm_bindgen::from_value(response).map_err(|e| format!("Failed to parse response: {:?}", e))
}

pub async fn active_tab() -> Result<Option<i32>, String> {
    let id = queryActiveTab().await.map_err(|e| js_error_message(&e))?;
    Ok(id.as_f64().map(|id| id as i32))
}

pub async fn create_tab(url: &str) -> Result<i32, String> {
    let id = createTab(url).await.map_err(|e| js_error_message(&e))?;
    id.as_f64()
        .map(|id| id as i32)
        .ok_or_else(|| "Created tab has no id".to_string())
}

pub async fn update_tab(tab_id: i32, url: &str) -> Result<(), String> {
    updateTab(tab_id, url).await.map_err(|e| js_error_message(&e))
}

pub async fn remove_tab(tab_id: i32) -> Result<(), String> {
    removeTab(tab_id).await.map_err(|e| js_error_message(&e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_response_success_range() {
        let ok = HttpResponse { status: 204, body: String::new() };
        let created = HttpResponse { status: 201, body: "{}".to_string() };
        let missing = HttpResponse { status: 404, body: String::new() };

        assert!(ok.is_success());
        assert!(created.is_success());
        assert!(!missing.is_success());
    }

    #[test]
    fn test_http_response_json_decode_error() {
        let response = HttpResponse { status: 200, body: "<html>".to_string() };
        let result: Result<Vec<String>> = response.json();

        assert!(matches!(result, Err(ApiError::Decode(_))));
    }
}
