//! folderbridge-ui
//!
//! Browser entry point: loads the workbench config, resolves the workspace
//! from the URL, creates the shell, and wires the "open local folder/files"
//! controls.

pub mod config;
pub mod dom;
pub mod location;
pub mod picker;
pub mod provider;
pub mod shell;
pub mod timer;

use std::rc::Rc;

use folderbridge_core::{
    load_config, local_scheme, trigger_controls, Bootstrapper, OpenFlow, PickerBridge,
    ProviderRegistrar, RegistrarConfig, ReloadHandshake, DEFAULT_CONFIG_URL,
};
use wasm_bindgen::prelude::*;

use crate::config::PageConfigSource;
use crate::dom::{render_triggers, show_toast, ToastNotifier};
use crate::location::{current_url_state, BrowserLocation};
use crate::picker::{detect_capabilities, WebPicker};
use crate::provider::WindowProviderProbe;
use crate::shell::JsShell;
use crate::timer::BrowserTimer;

thread_local! {
    static BOOTSTRAPPER: Bootstrapper<JsShell> = Bootstrapper::new(JsShell);
}

#[wasm_bindgen(start)]
pub fn main_js() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
    wasm_bindgen_futures::spawn_local(async {
        if let Err(e) = boot().await {
            web_sys::console::error_1(&e);
        }
    });
}

async fn boot() -> Result<(), JsValue> {
    let config = match load_config(&PageConfigSource, DEFAULT_CONFIG_URL).await {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "workbench config unavailable");
            show_toast(&e.to_string());
            return Err(e.to_string().into());
        }
    };

    let url = current_url_state();
    let handshake = Rc::new(ReloadHandshake::new(
        Rc::new(BrowserLocation),
        local_scheme(&config),
    ));

    BOOTSTRAPPER.with(|b| {
        b.bootstrap(&config, &url, Rc::clone(&handshake))
            .map(|_| ())
            .map_err(|e| JsValue::from(e.to_string()))
    })?;

    let capabilities = detect_capabilities();
    tracing::debug!(?capabilities, "native picker support");
    let triggers = trigger_controls(capabilities);
    if triggers.is_empty() {
        return Ok(());
    }

    let flow = Rc::new(OpenFlow::new(
        PickerBridge::new(WebPicker, capabilities),
        ProviderRegistrar::new(BrowserTimer, RegistrarConfig::from_config(&config)),
        Rc::new(WindowProviderProbe),
        handshake,
        Rc::new(ToastNotifier),
    ));
    render_triggers(&flow, &triggers)
}
