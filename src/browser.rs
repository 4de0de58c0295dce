use js_sys::{Function, Reflect};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{window, Element, Storage};

use crate::theme::{PreferenceStore, StoreError, Theme};
use crate::viewport::Region;

/// `window.localStorage`, looked up on every access so a store that becomes
/// unavailable mid-session degrades instead of failing.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStore;

fn local_storage() -> Option<Storage> {
    window()?.local_storage().ok().flatten()
}

impl PreferenceStore for BrowserStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let storage = local_storage().ok_or(StoreError::Unavailable)?;
        storage
            .get_item(key)
            .map_err(|error| StoreError::Rejected(format!("{error:?}")))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let storage = local_storage().ok_or(StoreError::Unavailable)?;
        storage
            .set_item(key, value)
            .map_err(|error| StoreError::Rejected(format!("{error:?}")))
    }
}

fn media_query_matches(query: &str) -> Option<bool> {
    window()?
        .match_media(query)
        .ok()
        .flatten()
        .map(|mq| mq.matches())
}

/// `None` when the host exposes no colour-scheme signal.
pub fn system_prefers_dark() -> Option<bool> {
    media_query_matches("(prefers-color-scheme: dark)")
}

fn prefers_reduced_motion() -> bool {
    media_query_matches("(prefers-reduced-motion: reduce)").unwrap_or(false)
}

pub fn apply_theme(theme: Theme) {
    if let Some(document) = window().and_then(|w| w.document()) {
        if let Some(root) = document.document_element() {
            let _ = root.set_attribute("data-theme", theme.as_str());
        }
    }
}

pub fn apply_theme_with_transition(theme: Theme) {
    if prefers_reduced_motion() {
        apply_theme(theme);
        return;
    }

    let Some(document) = window().and_then(|w| w.document()) else {
        apply_theme(theme);
        return;
    };

    let document_js: JsValue = document.into();
    let Ok(start_view_transition) =
        Reflect::get(&document_js, &JsValue::from_str("startViewTransition"))
    else {
        apply_theme(theme);
        return;
    };

    let Some(start_view_transition) = start_view_transition.dyn_ref::<Function>() else {
        apply_theme(theme);
        return;
    };

    let callback = Closure::once_into_js(move || apply_theme(theme));
    if start_view_transition.call1(&document_js, &callback).is_err() {
        apply_theme(theme);
    }
}

pub fn viewport_size() -> (f64, f64) {
    let Some(win) = window() else {
        return (1280.0, 720.0);
    };

    let width = win
        .inner_width()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(1280.0);
    let height = win
        .inner_height()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(720.0);

    (width, height)
}

pub fn scroll_y() -> f64 {
    window()
        .and_then(|w| w.scroll_y().ok())
        .unwrap_or(0.0)
}

pub fn device_pixel_ratio() -> f64 {
    window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0)
}

pub fn region_of(element: &Element) -> Region {
    let rect = element.get_bounding_client_rect();
    Region::new(rect.top(), rect.height())
}

pub fn current_year() -> u32 {
    js_sys::Date::new_0().get_full_year()
}
