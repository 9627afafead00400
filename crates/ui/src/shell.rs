//! Hands the merged config to the editor shell
//!
//! The shell bundle registers `window.__folderbridgeShell` with a
//! `create(element, options)` entry point before this module runs.

use std::rc::Rc;

use folderbridge_core::protocol::{WorkspaceConfig, WorkspaceTarget};
use folderbridge_core::{Error, OpenOptions, Result, ShellFactory, WorkspaceProvider};
use js_sys::{Function, Object, Promise, Reflect, JSON};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{window, HtmlElement};

const SHELL_GLOBAL: &str = "__folderbridgeShell";

fn shell_error(err: &JsValue) -> Error {
    Error::Shell(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

fn to_js(value: &impl Serialize) -> Result<JsValue> {
    let text = serde_json::to_string(value).map_err(|e| Error::Shell(e.to_string()))?;
    JSON::parse(&text).map_err(|e| shell_error(&e))
}

/// Read a workspace argument coming back from the shell
fn from_js(value: &JsValue) -> Option<WorkspaceTarget> {
    if value.is_undefined() || value.is_null() {
        return None;
    }
    let text = JSON::stringify(value).ok()?.as_string()?;
    serde_json::from_str(&text).ok()
}

#[derive(Default)]
pub struct JsShell;

impl JsShell {
    /// `workspaceProvider` object passed inside the shell options
    fn provider_object(provider: Rc<WorkspaceProvider>) -> Result<Object> {
        let object = Object::new();
        let workspace = match provider.workspace() {
            Some(target) => to_js(target)?,
            None => JsValue::UNDEFINED,
        };
        Reflect::set(&object, &"workspace".into(), &workspace).map_err(|e| shell_error(&e))?;
        Reflect::set(&object, &"trusted".into(), &provider.trusted().into())
            .map_err(|e| shell_error(&e))?;

        let open = Closure::wrap(Box::new(move |workspace: JsValue, options: JsValue| {
            let reuse = Reflect::get(&options, &"reuse".into())
                .ok()
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            let target = from_js(&workspace);
            match provider.open(target.as_ref(), OpenOptions { reuse }) {
                Ok(opened) => Promise::resolve(&JsValue::from(opened)),
                Err(e) => Promise::reject(&e.to_string().into()),
            }
        }) as Box<dyn Fn(JsValue, JsValue) -> Promise>);
        Reflect::set(&object, &"open".into(), open.as_ref()).map_err(|e| shell_error(&e))?;
        // Lives as long as the shell does
        open.forget();
        Ok(object)
    }
}

impl ShellFactory for JsShell {
    type Instance = JsValue;

    fn create(
        &self,
        mount: Option<&str>,
        config: &WorkspaceConfig,
        provider: Rc<WorkspaceProvider>,
    ) -> Result<JsValue> {
        let win = window().ok_or_else(|| Error::Shell("no window".to_string()))?;
        let document = win
            .document()
            .ok_or_else(|| Error::Shell("no document".to_string()))?;
        let element: HtmlElement = match mount {
            Some(id) => document
                .get_element_by_id(id)
                .ok_or_else(|| Error::Shell(format!("no element #{id}")))?
                .dyn_into()
                .map_err(|_| Error::Shell(format!("#{id} is not an HTML element")))?,
            None => document
                .body()
                .ok_or_else(|| Error::Shell("no body".to_string()))?,
        };

        let options = to_js(config)?;
        Reflect::set(
            &options,
            &"workspaceProvider".into(),
            &Self::provider_object(provider)?.into(),
        )
        .map_err(|e| shell_error(&e))?;

        let shell = Reflect::get(&win, &SHELL_GLOBAL.into()).map_err(|e| shell_error(&e))?;
        let create: Function = Reflect::get(&shell, &"create".into())
            .map_err(|e| shell_error(&e))?
            .dyn_into()
            .map_err(|_| Error::Shell(format!("{SHELL_GLOBAL}.create is missing")))?;
        create
            .call2(&shell, &element, &options)
            .map_err(|e| shell_error(&e))
    }
}
