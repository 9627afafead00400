//! Config loading: injected global first, then the JSON descriptor

use async_trait::async_trait;
use folderbridge_protocol::WorkspaceConfig;
use serde_json::Value;

use crate::{Error, Result};

/// Descriptor fetched when nothing was injected
pub const DEFAULT_CONFIG_URL: &str = "./workbench.json";

/// Where configuration can come from
#[async_trait(?Send)]
pub trait ConfigSource {
    /// A config object placed on the page before boot, if any
    ///
    /// `Some(Err(_))` means something was injected but could not be read;
    /// that is fatal rather than a reason to fall back to the fetch.
    fn injected(&self) -> Option<std::result::Result<Value, String>>;

    /// Fetch the descriptor body; non-success statuses are errors
    async fn fetch_text(&self, url: &str) -> std::result::Result<String, String>;
}

/// Load the workbench config
///
/// Not retried: any failure here is fatal to boot.
pub async fn load_config(source: &dyn ConfigSource, url: &str) -> Result<WorkspaceConfig> {
    if let Some(injected) = source.injected() {
        tracing::debug!("using injected workbench config");
        return injected
            .and_then(|value| WorkspaceConfig::from_value(value).map_err(|e| e.to_string()))
            .map_err(|e| Error::ConfigFetchFailure(format!("injected config: {e}")));
    }

    tracing::debug!(url, "fetching workbench config");
    let body = source
        .fetch_text(url)
        .await
        .map_err(|e| Error::ConfigFetchFailure(format!("{url}: {e}")))?;
    WorkspaceConfig::from_json(&body).map_err(|e| Error::ConfigFetchFailure(format!("{url}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use serde_json::json;
    use std::cell::Cell;

    struct StaticSource {
        injected: Option<std::result::Result<Value, String>>,
        body: std::result::Result<&'static str, &'static str>,
        fetches: Cell<u32>,
    }

    #[async_trait(?Send)]
    impl ConfigSource for StaticSource {
        fn injected(&self) -> Option<std::result::Result<Value, String>> {
            self.injected.clone()
        }

        async fn fetch_text(&self, _url: &str) -> std::result::Result<String, String> {
            self.fetches.set(self.fetches.get() + 1);
            self.body.map(str::to_string).map_err(str::to_string)
        }
    }

    fn source(
        injected: Option<std::result::Result<Value, String>>,
        body: std::result::Result<&'static str, &'static str>,
    ) -> StaticSource {
        StaticSource {
            injected,
            body,
            fetches: Cell::new(0),
        }
    }

    #[test]
    fn injected_config_skips_fetch() {
        let src = source(Some(Ok(json!({"domElementId": "root"}))), Err("unreachable"));
        let config = block_on(load_config(&src, DEFAULT_CONFIG_URL)).unwrap();
        assert_eq!(config.dom_element_id.as_deref(), Some("root"));
        assert_eq!(src.fetches.get(), 0);
    }

    #[test]
    fn fetched_config_is_parsed() {
        let src = source(None, Ok(r#"{"folderUri":"https://example.com/repo"}"#));
        let config = block_on(load_config(&src, DEFAULT_CONFIG_URL)).unwrap();
        assert_eq!(config.folder_uri.unwrap().path, "/repo");
        assert_eq!(src.fetches.get(), 1);
    }

    #[test]
    fn fetch_failure_is_fatal_and_not_retried() {
        let src = source(None, Err("404 Not Found"));
        let err = block_on(load_config(&src, DEFAULT_CONFIG_URL)).unwrap_err();
        assert!(matches!(err, Error::ConfigFetchFailure(ref m) if m.contains("404")));
        assert_eq!(src.fetches.get(), 1);
    }

    #[test]
    fn invalid_descriptor_is_a_fetch_failure() {
        let src = source(None, Ok("{not json"));
        assert!(matches!(
            block_on(load_config(&src, DEFAULT_CONFIG_URL)),
            Err(Error::ConfigFetchFailure(_))
        ));
    }

    #[test]
    fn unreadable_injected_config_blocks_boot_without_fetch() {
        let src = source(
            Some(Err("BigInt value can't be serialized in JSON".to_string())),
            Ok("{}"),
        );
        let err = block_on(load_config(&src, DEFAULT_CONFIG_URL)).unwrap_err();
        assert!(matches!(err, Error::ConfigFetchFailure(ref m) if m.contains("injected")));
        assert_eq!(src.fetches.get(), 0);
    }

    #[test]
    fn conflicting_injected_config_is_fatal() {
        let src = source(
            Some(Ok(json!({
                "folderUri": "https://a.example.com/x",
                "workspaceUri": "https://a.example.com/w.code-workspace"
            }))),
            Ok("{}"),
        );
        assert!(matches!(
            block_on(load_config(&src, DEFAULT_CONFIG_URL)),
            Err(Error::ConfigFetchFailure(_))
        ));
        assert_eq!(src.fetches.get(), 0);
    }
}
