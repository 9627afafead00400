//! Initial workspace resolution
//!
//! Runs on every page load, including the one right after a reload
//! handshake, and must give the same answer for the same inputs.

use folderbridge_protocol::{UrlState, WorkspaceConfig, WorkspaceTarget, DEFAULT_LOCAL_SCHEME};

/// Config option naming the scheme the filesystem provider serves
pub const LOCAL_SCHEME_OPTION: &str = "localScheme";

/// Scheme used for granted local folders
pub fn local_scheme(config: &WorkspaceConfig) -> &str {
    config
        .option_str(LOCAL_SCHEME_OPTION)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_LOCAL_SCHEME)
}

/// Decide which workspace the shell opens
///
/// Priority: local-access marker in the URL, then `?folder=`/`?workspace=`,
/// then the config's `folderUri`, then its `workspaceUri`. A local marker for a
/// scheme other than the configured one is ignored.
pub fn resolve_workspace(config: &WorkspaceConfig, url: &UrlState) -> Option<WorkspaceTarget> {
    let scheme = local_scheme(config);

    let local = url.local_target(scheme);
    if url.local.is_some() && local.is_none() {
        tracing::debug!(scheme, "ignoring local marker for a foreign scheme");
    }

    local
        .or_else(|| url.query_target())
        .or_else(|| WorkspaceTarget::from_config(config))
}
