/// UI module exports
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, HtmlInputElement};
use yew::prelude::*;

use crate::theme::ThemeSettings;

pub mod components;
pub mod page;
pub mod popup;
pub mod toolbar;

/// Write the theme variables onto the document root element
pub fn apply_theme(theme: &ThemeSettings) {
    let Some(root) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element())
        .and_then(|e| e.dyn_into::<HtmlElement>().ok())
    else {
        log::warn!("No document root to apply the theme to");
        return;
    };

    let style = root.style();
    for (name, value) in theme.css_variables("--") {
        if let Err(e) = style.set_property(&name, &value) {
            log::warn!("Failed to set {}: {:?}", name, e);
        }
    }
}

/// Current value of the input that fired `e`
pub fn input_value(e: &InputEvent) -> Option<String> {
    e.target_dyn_into::<HtmlInputElement>().map(|input| input.value())
}
