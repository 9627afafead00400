use async_trait::async_trait;
use folderbridge_core::ConfigSource;
use js_sys::{Reflect, JSON};
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{window, Response};

/// Global a hosting page can set to skip the fetch
pub const INJECTED_CONFIG_GLOBAL: &str = "__FOLDERBRIDGE_CONFIG__";

/// Reads the workbench descriptor from the page or the server
#[derive(Default)]
pub struct PageConfigSource;

#[async_trait(?Send)]
impl ConfigSource for PageConfigSource {
    fn injected(&self) -> Option<Result<Value, String>> {
        let win = window()?;
        let raw = Reflect::get(&win, &INJECTED_CONFIG_GLOBAL.into()).ok()?;
        if raw.is_undefined() || raw.is_null() {
            return None;
        }
        // Circular objects and BigInts make stringify throw
        let text = match JSON::stringify(&raw) {
            Ok(text) => text.as_string(),
            Err(e) => return Some(Err(describe(&e))),
        };
        let Some(text) = text else {
            return Some(Err("injected config is not a JSON object".to_string()));
        };
        Some(serde_json::from_str(&text).map_err(|e| e.to_string()))
    }

    async fn fetch_text(&self, url: &str) -> Result<String, String> {
        let win = window().ok_or("no window")?;
        let response: Response = JsFuture::from(win.fetch_with_str(url))
            .await
            .map_err(|e| describe(&e))?
            .dyn_into()
            .map_err(|_| "fetch did not yield a Response".to_string())?;
        if !response.ok() {
            return Err(format!("{url} answered {}", response.status()));
        }
        let text = JsFuture::from(response.text().map_err(|e| describe(&e))?)
            .await
            .map_err(|e| describe(&e))?;
        text.as_string().ok_or_else(|| "response body is not text".to_string())
    }
}

fn describe(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}
