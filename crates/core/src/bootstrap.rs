//! Workbench bootstrap: final config merge, the workspace provider handed to
//! the shell, and the one-shot shell creation

use std::rc::Rc;

use folderbridge_protocol::{UrlState, WorkspaceConfig, WorkspaceTarget};
use once_cell::unsync::OnceCell;

use crate::resolver::resolve_workspace;
use crate::{Capabilities, Error, ReloadHandshake, Result};

/// Config option controlling workspace trust
pub const TRUSTED_OPTION: &str = "workspaceTrusted";

/// Options the shell passes to [`WorkspaceProvider::open`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenOptions {
    /// Replace the current window instead of opening a new one
    pub reuse: bool,
}

/// Tells the shell which workspace is open and how to open another
///
/// Opening always goes through a navigation since the running shell keeps
/// its workspace for life.
pub struct WorkspaceProvider {
    workspace: Option<WorkspaceTarget>,
    trusted: bool,
    handshake: Rc<ReloadHandshake>,
}

impl WorkspaceProvider {
    pub fn new(
        workspace: Option<WorkspaceTarget>,
        trusted: bool,
        handshake: Rc<ReloadHandshake>,
    ) -> Self {
        Self {
            workspace,
            trusted,
            handshake,
        }
    }

    pub fn workspace(&self) -> Option<&WorkspaceTarget> {
        self.workspace.as_ref()
    }

    pub fn trusted(&self) -> bool {
        self.trusted
    }

    /// Open `workspace` (or an empty window for `None`)
    ///
    /// Returns whether a navigation was issued.
    pub fn open(
        &self,
        workspace: Option<&WorkspaceTarget>,
        options: OpenOptions,
    ) -> Result<bool> {
        let href = self.handshake.href_for(workspace)?;
        if options.reuse {
            self.handshake.navigate(&href)?;
            return Ok(true);
        }
        let opened = self.handshake.navigator().open_window(&href)?;
        if !opened {
            tracing::warn!(%href, "browser blocked the new window");
        }
        Ok(opened)
    }
}

/// Builds the shell
pub trait ShellFactory {
    type Instance;

    fn create(
        &self,
        mount: Option<&str>,
        config: &WorkspaceConfig,
        provider: Rc<WorkspaceProvider>,
    ) -> Result<Self::Instance>;
}

/// Overlay the resolved workspace onto the loaded config
///
/// With nothing resolved the config passes through untouched.
pub fn merge_config(
    config: &WorkspaceConfig,
    workspace: Option<&WorkspaceTarget>,
) -> WorkspaceConfig {
    let mut merged = config.clone();
    match workspace {
        Some(WorkspaceTarget::Folder { folder_uri }) => {
            merged.folder_uri = Some(folder_uri.clone());
            merged.workspace_uri = None;
        }
        Some(WorkspaceTarget::Workspace { workspace_uri }) => {
            merged.folder_uri = None;
            merged.workspace_uri = Some(workspace_uri.clone());
        }
        None => {}
    }
    merged
}

/// Creates the shell exactly once per page load
pub struct Bootstrapper<S: ShellFactory> {
    factory: S,
    instance: OnceCell<S::Instance>,
}

impl<S: ShellFactory> Bootstrapper<S> {
    pub fn new(factory: S) -> Self {
        Self {
            factory,
            instance: OnceCell::new(),
        }
    }

    pub fn instance(&self) -> Option<&S::Instance> {
        self.instance.get()
    }

    /// Resolve the workspace, merge config, and create the shell
    pub fn bootstrap(
        &self,
        config: &WorkspaceConfig,
        url: &UrlState,
        handshake: Rc<ReloadHandshake>,
    ) -> Result<&S::Instance> {
        if self.instance.get().is_some() {
            return Err(Error::AlreadyBootstrapped);
        }

        let workspace = resolve_workspace(config, url);
        let merged = merge_config(config, workspace.as_ref());
        let trusted = config
            .options
            .get(TRUSTED_OPTION)
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(true);

        match &workspace {
            Some(target) => tracing::info!(workspace = %target.uri(), "starting workbench"),
            None => tracing::info!("starting workbench without a workspace"),
        }

        let provider = Rc::new(WorkspaceProvider::new(workspace, trusted, handshake));
        let instance = self
            .factory
            .create(merged.dom_element_id.as_deref(), &merged, provider)?;
        self.instance
            .set(instance)
            .map_err(|_| Error::AlreadyBootstrapped)?;
        self.instance.get().ok_or(Error::AlreadyBootstrapped)
    }
}

/// A picker trigger control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    OpenFolder,
    OpenFiles,
}

impl Trigger {
    pub fn label(self) -> &'static str {
        match self {
            Self::OpenFolder => "Open Folder",
            Self::OpenFiles => "Open Files",
        }
    }

    pub fn element_id(self) -> &'static str {
        match self {
            Self::OpenFolder => "folderbridge-open-folder",
            Self::OpenFiles => "folderbridge-open-files",
        }
    }
}

/// Controls to render for the detected capabilities
pub fn trigger_controls(capabilities: Capabilities) -> Vec<Trigger> {
    let mut triggers = Vec::new();
    if capabilities.directory_picker {
        triggers.push(Trigger::OpenFolder);
    }
    if capabilities.file_picker {
        triggers.push(Trigger::OpenFiles);
    }
    triggers
}

#[cfg(test)]
mod tests {
    use super::*;
    use folderbridge_protocol::Uri;

    #[test]
    fn merge_without_workspace_is_identity() {
        let config = WorkspaceConfig::from_json(r#"{"domElementId":"app","x":1}"#).unwrap();
        assert_eq!(merge_config(&config, None), config);
    }

    #[test]
    fn merge_replaces_the_other_field() {
        let config =
            WorkspaceConfig::from_json(r#"{"workspaceUri":"file:///w.code-workspace"}"#).unwrap();
        let target = WorkspaceTarget::folder(Uri::scheme_root("localdir"));
        let merged = merge_config(&config, Some(&target));
        assert_eq!(merged.folder_uri, Some(Uri::scheme_root("localdir")));
        assert_eq!(merged.workspace_uri, None);
    }

    #[test]
    fn triggers_follow_capabilities() {
        assert!(trigger_controls(Capabilities::none()).is_empty());
        assert_eq!(
            trigger_controls(Capabilities::all()),
            vec![Trigger::OpenFolder, Trigger::OpenFiles]
        );
        assert_eq!(Trigger::OpenFolder.label(), "Open Folder");
    }
}
