//! `window.location` as the handshake's navigator

use folderbridge_core::protocol::UrlState;
use folderbridge_core::{Error, Navigator, Result};
use wasm_bindgen::JsValue;
use web_sys::{window, Location, Window};

fn current_window() -> Result<Window> {
    window().ok_or_else(|| Error::Navigation("no window".to_string()))
}

fn location() -> Result<Location> {
    Ok(current_window()?.location())
}

fn js_error(err: &JsValue) -> Error {
    Error::Navigation(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

/// URL state of the page as loaded
pub fn current_url_state() -> UrlState {
    let Ok(location) = location() else {
        return UrlState::default();
    };
    let search = location.search().unwrap_or_default();
    let hash = location.hash().unwrap_or_default();
    UrlState::parse(&search, &hash)
}

#[derive(Default)]
pub struct BrowserLocation;

impl Navigator for BrowserLocation {
    fn href(&self) -> Result<String> {
        location()?.href().map_err(|e| js_error(&e))
    }

    fn assign(&self, href: &str) -> Result<()> {
        location()?.assign(href).map_err(|e| js_error(&e))
    }

    fn reload(&self) -> Result<()> {
        location()?.reload().map_err(|e| js_error(&e))
    }

    fn open_window(&self, href: &str) -> Result<bool> {
        let opened = current_window()?
            .open_with_url_and_target(href, "_blank")
            .map_err(|e| js_error(&e))?;
        Ok(opened.is_some())
    }
}
