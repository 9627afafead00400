//! Native picker calls on `window`

use folderbridge_core::{Capabilities, NamedHandle, NativePicker, PickerFailure, UserGesture};
use futures::future::{FutureExt, LocalBoxFuture};
use js_sys::{Array, Function, Object, Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{window, DomException, FileSystemDirectoryHandle, FileSystemFileHandle};

const DIRECTORY_PICKER: &str = "showDirectoryPicker";
const FILE_PICKER: &str = "showOpenFilePicker";

pub struct DirectoryHandle(pub FileSystemDirectoryHandle);

impl NamedHandle for DirectoryHandle {
    fn name(&self) -> String {
        self.0.name()
    }
}

pub struct FileHandle(pub FileSystemFileHandle);

impl NamedHandle for FileHandle {
    fn name(&self) -> String {
        self.0.name()
    }
}

/// Probe `window` for the picker entry points
pub fn detect_capabilities() -> Capabilities {
    let Some(win) = window() else {
        return Capabilities::none();
    };
    let has = |name: &str| Reflect::has(&win, &name.into()).unwrap_or(false);
    Capabilities {
        directory_picker: has(DIRECTORY_PICKER),
        file_picker: has(FILE_PICKER),
    }
}

/// Calls `showDirectoryPicker` / `showOpenFilePicker`
#[derive(Default)]
pub struct WebPicker;

impl NativePicker for WebPicker {
    type Directory = DirectoryHandle;
    type File = FileHandle;

    fn show_directory_picker(
        &self,
        _gesture: UserGesture,
    ) -> LocalBoxFuture<'static, Result<DirectoryHandle, PickerFailure>> {
        let options = Object::new();
        let _ = Reflect::set(&options, &"mode".into(), &"readwrite".into());
        let promise = call_picker(DIRECTORY_PICKER, &options);
        async move {
            let value = JsFuture::from(promise?).await.map_err(into_failure)?;
            value
                .dyn_into::<FileSystemDirectoryHandle>()
                .map(DirectoryHandle)
                .map_err(|_| PickerFailure::Failed("picker returned a non-directory".to_string()))
        }
        .boxed_local()
    }

    fn show_open_file_picker(
        &self,
        _gesture: UserGesture,
    ) -> LocalBoxFuture<'static, Result<Vec<FileHandle>, PickerFailure>> {
        let options = Object::new();
        let _ = Reflect::set(&options, &"multiple".into(), &JsValue::TRUE);
        let promise = call_picker(FILE_PICKER, &options);
        async move {
            let value = JsFuture::from(promise?).await.map_err(into_failure)?;
            let handles: Array = value
                .dyn_into()
                .map_err(|_| PickerFailure::Failed("picker returned a non-array".to_string()))?;
            handles
                .iter()
                .map(|h| {
                    h.dyn_into::<FileSystemFileHandle>()
                        .map(FileHandle)
                        .map_err(|_| PickerFailure::Failed("picker returned a non-file".to_string()))
                })
                .collect::<Result<Vec<_>, _>>()
        }
        .boxed_local()
    }
}

/// Invoke `window[name](options)` right away; the browser checks for
/// transient activation at this call, not when the promise settles
fn call_picker(name: &str, options: &Object) -> Result<Promise, PickerFailure> {
    let win = window().ok_or_else(|| PickerFailure::Failed("no window".to_string()))?;
    let function: Function = Reflect::get(&win, &name.into())
        .map_err(into_failure)?
        .dyn_into()
        .map_err(|_| PickerFailure::Failed(format!("{name} is not a function")))?;
    function
        .call1(&win, options)
        .map_err(into_failure)?
        .dyn_into::<Promise>()
        .map_err(|_| PickerFailure::Failed(format!("{name} did not return a promise")))
}

fn into_failure(err: JsValue) -> PickerFailure {
    if let Some(exception) = err.dyn_ref::<DomException>() {
        if exception.name() == "AbortError" {
            return PickerFailure::Aborted;
        }
        return PickerFailure::Failed(format!("{}: {}", exception.name(), exception.message()));
    }
    PickerFailure::Failed(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}
