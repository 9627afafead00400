use std::rc::Rc;

use folderbridge_core::{FlowState, Notifier, OpenFlow, Trigger, UserGesture};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{window, Document, Element, HtmlElement};

use crate::picker::WebPicker;
use crate::timer::BrowserTimer;

const TOAST_ID: &str = "folderbridge-toast";
const TOAST_MILLIS: i32 = 6000;
const TRIGGER_BAR_ID: &str = "folderbridge-triggers";

pub type BrowserFlow = OpenFlow<WebPicker, BrowserTimer>;

fn get_document() -> Option<Document> {
    window().and_then(|w| w.document())
}

/// The toast element, created on first use
fn toast_element(doc: &Document) -> Option<Element> {
    if let Some(el) = doc.get_element_by_id(TOAST_ID) {
        return Some(el);
    }
    let el = doc.create_element("div").ok()?;
    el.set_id(TOAST_ID);
    let _ = el.set_attribute("role", "alert");
    let _ = el.set_attribute(
        "style",
        "position:fixed;left:50%;bottom:24px;transform:translateX(-50%);z-index:10000;\
         padding:8px 16px;border-radius:4px;background:#333;color:#fff;font:13px sans-serif;",
    );
    doc.body()?.append_child(&el).ok()?;
    Some(el)
}

/// Show a toast notification (auto-hides)
pub fn show_toast(message: &str) {
    let Some(doc) = get_document() else {
        return;
    };
    let Some(el) = toast_element(&doc) else {
        web_sys::console::error_1(&message.into());
        return;
    };
    el.set_text_content(Some(message));
    if let Ok(html_el) = el.clone().dyn_into::<HtmlElement>() {
        let _ = html_el.style().set_property("display", "block");
    }

    let callback = Closure::once(Box::new(move || {
        if let Ok(html_el) = el.dyn_into::<HtmlElement>() {
            let _ = html_el.style().set_property("display", "none");
        }
    }) as Box<dyn FnOnce()>);
    if let Some(win) = window() {
        let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            TOAST_MILLIS,
        );
    }
    callback.forget();
}

/// Alerts surface as toasts
#[derive(Default)]
pub struct ToastNotifier;

impl Notifier for ToastNotifier {
    fn alert(&self, message: &str) {
        show_toast(message);
    }
}

/// Add one button per trigger, wired to `flow`
///
/// Buttons are disabled while a flow is in flight and stay disabled once a
/// reload has been issued.
pub fn render_triggers(flow: &Rc<BrowserFlow>, triggers: &[Trigger]) -> Result<(), JsValue> {
    let doc = get_document().ok_or("No document found")?;
    let body = doc.body().ok_or("No body found")?;

    let bar = doc.create_element("div")?;
    bar.set_id(TRIGGER_BAR_ID);
    bar.set_attribute(
        "style",
        "position:fixed;top:8px;right:8px;z-index:10000;display:flex;gap:6px;",
    )?;

    let mut buttons = Vec::with_capacity(triggers.len());
    for &trigger in triggers {
        let btn = doc.create_element("button")?;
        btn.set_id(trigger.element_id());
        btn.set_text_content(Some(trigger.label()));

        let flow = Rc::clone(flow);
        let on_click = Closure::wrap(Box::new(move || {
            // The picker must start before this handler returns
            let gesture = UserGesture::inside_handler();
            let pending = match trigger {
                Trigger::OpenFolder => flow.open_directory(gesture),
                Trigger::OpenFiles => flow.open_files(gesture),
            };
            wasm_bindgen_futures::spawn_local(async move {
                // Failures were already reported by the flow
                let _ = pending.await;
            });
        }) as Box<dyn FnMut()>);
        btn.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        on_click.forget();

        bar.append_child(&btn)?;
        buttons.push(btn);
    }

    flow.guard().on_change(move |state| {
        for btn in &buttons {
            let _ = match state {
                FlowState::InFlight | FlowState::Reloading => btn.set_attribute("disabled", ""),
                FlowState::Idle => btn.remove_attribute("disabled"),
            };
        }
    });

    body.append_child(&bar)?;
    Ok(())
}
