//! Reload handshake
//!
//! The shell can't rebind its workspace once running, so switching means
//! writing the target into the URL and navigating. The resolver reads it back
//! on the next load.

use std::rc::Rc;

use folderbridge_protocol::{clear_target, encode_target, WorkspaceTarget};

use crate::{Error, Result};

/// Page location access
pub trait Navigator {
    /// Current `location.href`
    fn href(&self) -> Result<String>;

    /// Navigate the current page to `href`
    fn assign(&self, href: &str) -> Result<()>;

    /// Force a full reload of the current document
    fn reload(&self) -> Result<()>;

    /// Open `href` in a new browsing context; `false` if the browser refused
    fn open_window(&self, href: &str) -> Result<bool>;
}

/// Encodes workspace targets into the URL and performs the navigation
pub struct ReloadHandshake {
    navigator: Rc<dyn Navigator>,
    local_scheme: String,
}

impl ReloadHandshake {
    pub fn new(navigator: Rc<dyn Navigator>, local_scheme: impl Into<String>) -> Self {
        Self {
            navigator,
            local_scheme: local_scheme.into(),
        }
    }

    pub fn local_scheme(&self) -> &str {
        &self.local_scheme
    }

    pub fn navigator(&self) -> &dyn Navigator {
        self.navigator.as_ref()
    }

    /// The href that resolves to `target` after a reload; `None` clears it
    pub fn href_for(&self, target: Option<&WorkspaceTarget>) -> Result<String> {
        let current = self.navigator.href()?;
        let encoded = match target {
            Some(target) => encode_target(&current, target, &self.local_scheme),
            None => clear_target(&current),
        };
        encoded.map_err(|e| Error::Navigation(e.to_string()))
    }

    /// Write `target` into the URL and reload the page
    pub fn reload_into(&self, target: Option<&WorkspaceTarget>) -> Result<()> {
        let next = self.href_for(target)?;
        self.navigate(&next)
    }

    /// Navigate to `next`, reloading explicitly when only the fragment differs
    pub fn navigate(&self, next: &str) -> Result<()> {
        let current = self.navigator.href()?;
        tracing::info!(href = %next, "reloading into new workspace");
        self.navigator.assign(next)?;
        if without_fragment(&current) == without_fragment(next) {
            // Fragment-only changes don't unload the page
            self.navigator.reload()?;
        }
        Ok(())
    }
}

fn without_fragment(href: &str) -> &str {
    href.split_once('#').map_or(href, |(base, _)| base)
}
