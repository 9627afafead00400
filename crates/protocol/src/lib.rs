//! Shared types for folderbridge
//!
//! Defines the workbench config descriptor, structured URIs, and the URL
//! encoding used to carry a workspace choice across a page reload.

pub mod config;
pub mod uri;
pub mod url_state;

pub use config::{WorkspaceConfig, WorkspaceTarget};
pub use uri::Uri;
pub use url_state::{clear_target, encode_target, UrlParam, UrlState, DEFAULT_LOCAL_SCHEME};

/// Errors raised while decoding protocol values
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("invalid URI `{input}`: {reason}")]
    InvalidUri { input: String, reason: String },
    #[error("configuration sets both folderUri and workspaceUri")]
    ConflictingWorkspace,
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
