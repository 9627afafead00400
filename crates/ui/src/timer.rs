use std::time::Duration;

use async_trait::async_trait;
use folderbridge_core::Timer;
use js_sys::Promise;
use wasm_bindgen_futures::JsFuture;
use web_sys::window;

/// `performance.now()` and `setTimeout`
#[derive(Default)]
pub struct BrowserTimer;

#[async_trait(?Send)]
impl Timer for BrowserTimer {
    fn now(&self) -> Duration {
        let millis = window()
            .and_then(|w| w.performance())
            .map_or_else(js_sys::Date::now, |p| p.now());
        Duration::from_secs_f64(millis.max(0.0) / 1000.0)
    }

    async fn sleep(&self, duration: Duration) {
        let millis = i32::try_from(duration.as_millis()).unwrap_or(i32::MAX);
        let promise = Promise::new(&mut |resolve, _reject| {
            if let Some(win) = window() {
                let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis);
            }
        });
        let _ = JsFuture::from(promise).await;
    }
}
