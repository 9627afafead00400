//! Workspace intent carried in the page URL across a full reload
//!
//! Two encodings are understood:
//! - query `?local=<scheme>`: a literal scheme marker
//! - fragment `#<percent-encoded JSON>`: `{"folderUri": <Uri>}`
//!
//! Non-local targets opened through the workspace provider use
//! `?folder=<uri>` / `?workspace=<uri>` instead.

use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

use crate::{ProtocolError, Uri, WorkspaceTarget};

/// Scheme the filesystem provider registers for granted local directories
pub const DEFAULT_LOCAL_SCHEME: &str = "localdir";

/// Query parameters owned by the reload handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlParam {
    Local,     // local
    Folder,    // folder
    Workspace, // workspace
    Unknown(String),
}

impl From<&str> for UrlParam {
    fn from(s: &str) -> Self {
        match s {
            "local" => Self::Local,
            "folder" => Self::Folder,
            "workspace" => Self::Workspace,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl std::fmt::Display for UrlParam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Local => "local",
            Self::Folder => "folder",
            Self::Workspace => "workspace",
            Self::Unknown(s) => s,
        };
        write!(f, "{s}")
    }
}

/// Fragment payload written before a reload
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Handoff {
    folder_uri: Uri,
}

/// Workspace intent decoded from the current URL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlState {
    /// Scheme named by `?local=`
    pub local: Option<String>,
    /// Folder carried in the fragment JSON
    pub handoff: Option<Uri>,
    pub folder: Option<Uri>,
    pub workspace: Option<Uri>,
}

impl UrlState {
    /// Decode from `location.search` and `location.hash` (leading `?`/`#` optional)
    ///
    /// Malformed values are dropped; a broken URL never blocks boot.
    pub fn parse(search: &str, hash: &str) -> Self {
        let mut state = Self::default();

        let query = search.trim_start_matches('?');
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match UrlParam::from(key.as_ref()) {
                UrlParam::Local if !value.is_empty() => state.local = Some(value.into_owned()),
                UrlParam::Folder => state.folder = Uri::parse(&value).ok(),
                UrlParam::Workspace => state.workspace = Uri::parse(&value).ok(),
                _ => {}
            }
        }

        state.handoff = decode_fragment(hash);
        state
    }

    /// Decode from a full href
    pub fn from_href(href: &str) -> Result<Self, ProtocolError> {
        let url = parse_href(href)?;
        Ok(Self::parse(
            url.query().unwrap_or_default(),
            url.fragment().unwrap_or_default(),
        ))
    }

    /// The local-access workspace the URL announces for `scheme`, if any
    ///
    /// The fragment wins when it names a folder on `scheme`, since it carries
    /// the folder name; otherwise a matching bare marker resolves to the scheme
    /// root. Schemes compare case-insensitively and the result always uses
    /// `scheme` as given.
    pub fn local_target(&self, scheme: &str) -> Option<WorkspaceTarget> {
        if let Some(uri) = self.handoff.as_ref().filter(|u| u.has_scheme(scheme)) {
            let mut uri = uri.clone();
            uri.scheme = scheme.to_string();
            return Some(WorkspaceTarget::folder(uri));
        }
        self.local
            .as_deref()
            .filter(|marker| marker.eq_ignore_ascii_case(scheme))
            .map(|_| WorkspaceTarget::folder(Uri::scheme_root(scheme)))
    }

    /// Non-local workspace named by `?folder=` or `?workspace=`
    pub fn query_target(&self) -> Option<WorkspaceTarget> {
        self.folder
            .clone()
            .map(WorkspaceTarget::folder)
            .or_else(|| self.workspace.clone().map(WorkspaceTarget::workspace))
    }
}

fn parse_href(href: &str) -> Result<url::Url, ProtocolError> {
    url::Url::parse(href).map_err(|e| ProtocolError::InvalidUri {
        input: href.to_string(),
        reason: e.to_string(),
    })
}

fn decode_fragment(hash: &str) -> Option<Uri> {
    let raw = hash.trim_start_matches('#');
    if raw.is_empty() {
        return None;
    }
    let json = percent_decode_str(raw).decode_utf8().ok()?;
    if !json.trim_start().starts_with('{') {
        return None;
    }
    serde_json::from_str::<Handoff>(&json)
        .ok()
        .map(|h| h.folder_uri)
}

/// Rewrite `href` so that, after a reload, the URL resolves to `target`
///
/// Handshake-owned query parameters are replaced; all others are kept.
pub fn encode_target(
    href: &str,
    target: &WorkspaceTarget,
    local_scheme: &str,
) -> Result<String, ProtocolError> {
    let mut url = parse_href(href)?;

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| matches!(UrlParam::from(key.as_ref()), UrlParam::Unknown(_)))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (k, v) in &kept {
            pairs.append_pair(k, v);
        }
        match target {
            _ if target.is_local(local_scheme) => {
                pairs.append_pair(&UrlParam::Local.to_string(), &target.uri().scheme);
            }
            WorkspaceTarget::Folder { folder_uri } => {
                pairs.append_pair(&UrlParam::Folder.to_string(), &folder_uri.to_string());
            }
            WorkspaceTarget::Workspace { workspace_uri } => {
                pairs.append_pair(&UrlParam::Workspace.to_string(), &workspace_uri.to_string());
            }
        }
    }

    if target.is_local(local_scheme) {
        let handoff = Handoff {
            folder_uri: target.uri().clone(),
        };
        let json = serde_json::to_string(&handoff)?;
        let encoded = utf8_percent_encode(&json, NON_ALPHANUMERIC).to_string();
        url.set_fragment(Some(&encoded));
    } else {
        url.set_fragment(None);
    }

    Ok(url.to_string())
}

/// Strip every handshake-owned parameter and the fragment from `href`
pub fn clear_target(href: &str) -> Result<String, ProtocolError> {
    let mut url = parse_href(href)?;
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| matches!(UrlParam::from(key.as_ref()), UrlParam::Unknown(_)))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(&kept);
    }
    url.set_fragment(None);
    Ok(url.to_string())
}
