/// TV Box Toolbar - start page and Chrome extension for a personal link launcher
/// Built with Rust + WASM + Yew

mod error;
mod link;
mod icon;
mod icon_catalog;
mod theme;
mod toolbar;
mod grid;
mod settings;
mod store;
mod bridge;
mod config;
mod messages;
mod navigation;
mod background;
pub mod ui;

use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};

use crate::background::{BackgroundService, ChromeConfigStorage, WELCOME_MESSAGE, WELCOME_TITLE};
use crate::config::CONFIG_STORAGE_KEY;
use crate::messages::{Request, Response};
use crate::navigation::{ChromeTabs, TabId, TabManager};
use crate::store::HttpStore;

/// Id of the element the content script mounts the toolbar into
const TOOLBAR_ROOT_ID: &str = "tvbox-root";

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Start the Yew app for the start page
#[wasm_bindgen]
pub fn start_page() {
    yew::Renderer::<ui::page::App>::new().render();
}

// Start the Yew app for the extension popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}

// Inject the hover toolbar into the current page (content script)
#[wasm_bindgen]
pub fn start_toolbar() -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("No document"))?;

    if document.get_element_by_id(TOOLBAR_ROOT_ID).is_some() {
        log::debug!("Toolbar already injected");
        return Ok(());
    }

    let root = document.create_element("div")?;
    root.set_id(TOOLBAR_ROOT_ID);
    document
        .body()
        .ok_or_else(|| JsValue::from_str("No body"))?
        .append_child(&root)?;

    yew::Renderer::<ui::toolbar::ContentToolbar>::with_root(root).render();
    Ok(())
}

fn show_badge(badge: (&str, &str)) {
    let (text, color) = badge;
    bridge::set_badge(text, color);
}

// Service worker entry: message dispatch, managed tab, badge
#[wasm_bindgen]
pub fn start_background() {
    let service = Rc::new(BackgroundService::new(
        ChromeConfigStorage,
        TabManager::new(ChromeTabs, None),
        |url: &str| HttpStore::new(url),
    ));

    let on_message = {
        let service = service.clone();
        Closure::wrap(Box::new(move |message: JsValue| {
            let service = service.clone();
            future_to_promise(async move {
                let response = match serde_wasm_bindgen::from_value::<Request>(message) {
                    Ok(request) => service.handle(request).await,
                    Err(e) => {
                        log::warn!("Ignoring unknown message: {}", e);
                        Response::failed(format!("Unknown message: {}", e))
                    }
                };
                serde_wasm_bindgen::to_value(&response).map_err(|e| JsValue::from_str(&e.to_string()))
            })
        }) as Box<dyn Fn(JsValue) -> js_sys::Promise>)
    };
    bridge::on_message(on_message.as_ref().unchecked_ref());
    on_message.forget();

    let on_created = {
        let service = service.clone();
        Closure::wrap(Box::new(move |tab: TabId| {
            let service = service.clone();
            spawn_local(async move { service.tabs().tab_created(tab).await });
        }) as Box<dyn Fn(TabId)>)
    };
    bridge::on_tab_created(on_created.as_ref().unchecked_ref());
    on_created.forget();

    let on_removed = {
        let service = service.clone();
        Closure::wrap(Box::new(move |tab: TabId| service.tabs().tab_removed(tab)) as Box<dyn Fn(TabId)>)
    };
    bridge::on_tab_removed(on_removed.as_ref().unchecked_ref());
    on_removed.forget();

    let on_installed = {
        let service = service.clone();
        Closure::wrap(Box::new(move |reason: String| {
            let service = service.clone();
            spawn_local(async move {
                match service.installed(&reason).await {
                    Ok(true) => bridge::show_notification(WELCOME_TITLE, WELCOME_MESSAGE),
                    Ok(false) => {}
                    Err(e) => log::error!("Failed to write default config: {}", e),
                }
            });
        }) as Box<dyn Fn(String)>)
    };
    bridge::on_installed(on_installed.as_ref().unchecked_ref());
    on_installed.forget();

    let on_config_changed = {
        let service = service.clone();
        Closure::wrap(Box::new(move || {
            let service = service.clone();
            spawn_local(async move { show_badge(service.badge().await) });
        }) as Box<dyn Fn()>)
    };
    bridge::on_storage_changed(CONFIG_STORAGE_KEY, on_config_changed.as_ref().unchecked_ref());
    on_config_changed.forget();

    spawn_local(async move {
        match bridge::active_tab().await {
            Ok(Some(tab)) => service.tabs().adopt(tab),
            Ok(None) => {}
            Err(e) => log::warn!("Could not query active tab: {}", e),
        }
        show_badge(service.badge().await);
        log::info!("Background service started");
    });
}
