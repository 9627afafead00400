//! Structured URI values
//!
//! The workbench exchanges URIs as component objects
//! (`{"scheme": "...", "authority": "...", "path": "..."}`), while hand-written
//! config files usually carry plain strings. [`Uri`] accepts both on the way in
//! and always serializes as components.

use std::fmt;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// Characters escaped when a path is rendered back into a URI string
const PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'%');

/// A parsed URI, split into the components the workbench understands
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "UriRepr")]
pub struct Uri {
    pub scheme: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub authority: String,
    pub path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub query: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub fragment: String,
}

/// Wire shapes a URI may arrive in
#[derive(Deserialize)]
#[serde(untagged)]
enum UriRepr {
    Text(String),
    Components(UriComponents),
}

#[derive(Deserialize)]
struct UriComponents {
    scheme: String,
    #[serde(default)]
    authority: String,
    #[serde(default)]
    path: String,
    #[serde(default)]
    query: String,
    #[serde(default)]
    fragment: String,
}

impl TryFrom<UriRepr> for Uri {
    type Error = ProtocolError;

    fn try_from(repr: UriRepr) -> Result<Self, Self::Error> {
        match repr {
            UriRepr::Text(text) => Self::parse(&text),
            UriRepr::Components(c) => {
                if c.scheme.is_empty() {
                    return Err(ProtocolError::InvalidUri {
                        input: c.path,
                        reason: "missing scheme".to_string(),
                    });
                }
                Ok(Self {
                    scheme: c.scheme,
                    authority: c.authority,
                    path: c.path,
                    query: c.query,
                    fragment: c.fragment,
                })
            }
        }
    }
}

impl Uri {
    /// Parse a URI string such as `https://example.com/ext` or `localdir:/project`
    pub fn parse(input: &str) -> Result<Self, ProtocolError> {
        let url = url::Url::parse(input).map_err(|e| ProtocolError::InvalidUri {
            input: input.to_string(),
            reason: e.to_string(),
        })?;

        let mut authority = String::new();
        if !url.username().is_empty() {
            authority.push_str(url.username());
            authority.push('@');
        }
        if let Some(host) = url.host_str() {
            authority.push_str(host);
        }
        if let Some(port) = url.port() {
            authority.push_str(&format!(":{port}"));
        }

        Ok(Self {
            scheme: url.scheme().to_string(),
            authority,
            path: percent_decode_str(url.path()).decode_utf8_lossy().into_owned(),
            query: url.query().unwrap_or_default().to_string(),
            fragment: url.fragment().unwrap_or_default().to_string(),
        })
    }

    /// Root of a local-access scheme, e.g. `localdir:/`
    pub fn scheme_root(scheme: &str) -> Self {
        Self::with_path(scheme, "/")
    }

    /// A folder directly below the scheme root, e.g. `localdir:/project`
    pub fn scheme_folder(scheme: &str, name: &str) -> Self {
        let name = name.trim_matches('/');
        if name.is_empty() {
            Self::scheme_root(scheme)
        } else {
            Self::with_path(scheme, &format!("/{name}"))
        }
    }

    fn with_path(scheme: &str, path: &str) -> Self {
        Self {
            scheme: scheme.to_string(),
            authority: String::new(),
            path: path.to_string(),
            query: String::new(),
            fragment: String::new(),
        }
    }

    /// Whether this URI lives under the given scheme (case-insensitive)
    pub fn has_scheme(&self, scheme: &str) -> bool {
        self.scheme.eq_ignore_ascii_case(scheme)
    }

    /// Last path segment, used as a display name
    pub fn basename(&self) -> &str {
        self.path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.scheme)?;
        if !self.authority.is_empty() {
            write!(f, "//{}", self.authority)?;
        }
        write!(f, "{}", utf8_percent_encode(&self.path, PATH))?;
        if !self.query.is_empty() {
            write!(f, "?{}", self.query)?;
        }
        if !self.fragment.is_empty() {
            write!(f, "#{}", self.fragment)?;
        }
        Ok(())
    }
}
