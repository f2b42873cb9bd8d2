//! Browser side of the routing boundary: `location.hash`, session history,
//! `document.title` and window events.

use crate::routing::Location;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::window;

#[derive(Clone, Copy, Default)]
pub struct BrowserLocation;

impl Location for BrowserLocation {
    fn hash(&self) -> String {
        window()
            .and_then(|w| w.location().hash().ok())
            .unwrap_or_default()
    }

    fn set_hash(&self, hash: &str) {
        if let Some(w) = window() {
            if let Err(e) = w.location().set_hash(hash) {
                log::error!("set_hash failed: {:?}", e);
            }
        }
    }

    fn back(&self) {
        if let Some(history) = window().and_then(|w| w.history().ok()) {
            let _ = history.back();
        }
    }

    fn title(&self) -> String {
        window()
            .and_then(|w| w.document())
            .map(|d| d.title())
            .unwrap_or_default()
    }

    fn set_title(&self, title: &str) {
        if let Some(document) = window().and_then(|w| w.document()) {
            document.set_title(title);
        }
    }
}

/// Run `handler` on every `event` dispatched to the window, for the life of
/// the page.
pub fn on_window_event(event: &str, handler: impl Fn(web_sys::Event) + 'static) {
    let Some(window) = window() else {
        return;
    };
    let closure = Closure::wrap(Box::new(handler) as Box<dyn Fn(web_sys::Event)>);
    if let Err(e) = window.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
        log::error!("cannot listen to {}: {:?}", event, e);
    }
    closure.forget();
}

/// Optional configuration override injected by the boot payload as
/// `window.desk_config` (a TOML string).
pub fn boot_config() -> Option<String> {
    let window = window()?;
    js_sys::Reflect::get(&window, &JsValue::from_str("desk_config"))
        .ok()?
        .as_string()
}
