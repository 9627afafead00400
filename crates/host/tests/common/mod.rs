//! Common test utilities
#![allow(dead_code)] // Not every test file uses every helper

use axum::body::{to_bytes, Body};
use axum::http::{Request, Response};
use axum::Router;
use folderbridge_host::server;
use folderbridge_protocol::WorkspaceConfig;
use tempfile::TempDir;
use tower::ServiceExt;

pub const INDEX_HTML: &str = "<!doctype html><div id=\"workbench\"></div>";

/// A served directory plus the router over it
pub struct TestSite {
    pub dir: TempDir,
    pub app: Router,
}

impl TestSite {
    pub fn new(descriptor: WorkspaceConfig) -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), INDEX_HTML).unwrap();
        std::fs::create_dir(dir.path().join("pkg")).unwrap();
        std::fs::write(dir.path().join("pkg/folderbridge_ui.js"), "export default 1;").unwrap();
        let app = server::router(descriptor, dir.path());
        Self { dir, app }
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.app
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
