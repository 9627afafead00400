//! The page-hosted filesystem provider
//!
//! The extension that serves the local scheme publishes itself as
//! `window.__folderbridgeFs` and calls `folderbridgeProviderReady` once it
//! can accept handles.

use std::rc::Rc;

use folderbridge_core::{ActivationSignal, Error, FileSystemProvider, Grant, ProviderProbe, Result};
use futures::future::LocalBoxFuture;
use js_sys::{Array, Function, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::window;

use crate::picker::{DirectoryHandle, FileHandle};

const PROVIDER_GLOBAL: &str = "__folderbridgeFs";

type Provider = Rc<dyn FileSystemProvider<DirectoryHandle, FileHandle>>;

thread_local! {
    static ACTIVATION: Rc<ActivationSignal<DirectoryHandle, FileHandle>> =
        Rc::new(ActivationSignal::new());
}

/// Wraps the JS object exposing `setDirectoryHandle` / `setFileHandles`
pub struct JsFileSystemProvider {
    target: JsValue,
}

impl JsFileSystemProvider {
    pub fn new(target: JsValue) -> Self {
        Self { target }
    }

    fn call(&self, method: &str, arg: &JsValue) -> Result<()> {
        let function: Function = Reflect::get(&self.target, &method.into())
            .ok()
            .and_then(|f| f.dyn_into().ok())
            .ok_or_else(|| Error::ProviderRejected(format!("provider has no {method}")))?;
        function
            .call1(&self.target, arg)
            .map(|_| ())
            .map_err(|e| Error::ProviderRejected(format!("{e:?}")))
    }
}

impl FileSystemProvider<DirectoryHandle, FileHandle> for JsFileSystemProvider {
    fn bind(&self, grant: Grant<DirectoryHandle, FileHandle>) -> Result<()> {
        match grant {
            Grant::Directory(dir) => self.call("setDirectoryHandle", &dir.0),
            Grant::Files(files) => {
                let handles: Array = files.into_iter().map(|f| JsValue::from(f.0)).collect();
                self.call("setFileHandles", &handles)
            }
        }
    }
}

/// Called by the provider extension when it finishes activating
#[wasm_bindgen(js_name = folderbridgeProviderReady)]
pub fn provider_ready(provider: JsValue) -> bool {
    let provider: Provider = Rc::new(JsFileSystemProvider::new(provider));
    let first = ACTIVATION.with(|signal| signal.notify(provider));
    if first {
        tracing::info!("filesystem provider activated");
    }
    first
}

/// Pushed activation first, falling back to the window global
#[derive(Default)]
pub struct WindowProviderProbe;

impl ProviderProbe<DirectoryHandle, FileHandle> for WindowProviderProbe {
    fn lookup(&self) -> Option<Provider> {
        if let Some(provider) = ACTIVATION.with(|signal| signal.lookup()) {
            return Some(provider);
        }
        let win = window()?;
        let global = Reflect::get(&win, &PROVIDER_GLOBAL.into()).ok()?;
        if global.is_undefined() || global.is_null() {
            return None;
        }
        Some(Rc::new(JsFileSystemProvider::new(global)))
    }

    fn activation(&self) -> Option<LocalBoxFuture<'static, ()>> {
        ACTIVATION.with(|signal| signal.activation())
    }
}
