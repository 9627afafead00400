mod common;

use std::cell::Cell;
use std::rc::Rc;

use common::{FakeLocation, PAGE};
use folderbridge_core::protocol::{Uri, UrlState, WorkspaceConfig, WorkspaceTarget};
use folderbridge_core::{
    trigger_controls, Bootstrapper, Capabilities, Error, OpenOptions, ReloadHandshake, Result,
    ShellFactory, WorkspaceProvider,
};

/// What the shell was created with
struct CreatedShell {
    mount: Option<String>,
    config: WorkspaceConfig,
    provider: Rc<WorkspaceProvider>,
}

#[derive(Default)]
struct RecordingShell {
    creations: Rc<Cell<u32>>,
}

impl ShellFactory for RecordingShell {
    type Instance = CreatedShell;

    fn create(
        &self,
        mount: Option<&str>,
        config: &WorkspaceConfig,
        provider: Rc<WorkspaceProvider>,
    ) -> Result<CreatedShell> {
        self.creations.set(self.creations.get() + 1);
        Ok(CreatedShell {
            mount: mount.map(ToString::to_string),
            config: config.clone(),
            provider,
        })
    }
}

fn handshake(location: &Rc<FakeLocation>) -> Rc<ReloadHandshake> {
    Rc::new(ReloadHandshake::new(location.clone(), "localdir"))
}

/// Empty config, no URL state, no native pickers
#[test]
fn bare_page_boots_with_config_untouched() {
    let location = FakeLocation::at(PAGE);
    let config = WorkspaceConfig::from_json("{}").unwrap();
    let url = UrlState::from_href(PAGE).unwrap();
    let bootstrapper = Bootstrapper::new(RecordingShell::default());

    let shell = bootstrapper
        .bootstrap(&config, &url, handshake(&location))
        .unwrap();

    assert_eq!(shell.config, config);
    assert_eq!(shell.mount, None);
    assert!(shell.provider.workspace().is_none());
    assert!(trigger_controls(Capabilities::none()).is_empty());
}

#[test]
fn shell_is_created_once() {
    let location = FakeLocation::at(PAGE);
    let shell = RecordingShell::default();
    let creations = Rc::clone(&shell.creations);
    let bootstrapper = Bootstrapper::new(shell);
    let config = WorkspaceConfig::default();
    let url = UrlState::default();

    assert!(bootstrapper
        .bootstrap(&config, &url, handshake(&location))
        .is_ok());
    let again = bootstrapper.bootstrap(&config, &url, handshake(&location));

    assert!(matches!(again, Err(Error::AlreadyBootstrapped)));
    assert_eq!(creations.get(), 1);
    assert!(bootstrapper.instance().is_some());
}

#[test]
fn reloaded_page_mounts_local_folder() {
    let location = FakeLocation::at(PAGE);
    let target = WorkspaceTarget::folder(Uri::scheme_folder("localdir", "site"));
    handshake(&location).reload_into(Some(&target)).unwrap();

    // Fresh page load at the new URL
    let href = location.href.borrow().clone();
    let config = WorkspaceConfig::from_json(
        r#"{"domElementId":"workbench","folderUri":"https://repo.example.com/default"}"#,
    )
    .unwrap();
    let bootstrapper = Bootstrapper::new(RecordingShell::default());
    let shell = bootstrapper
        .bootstrap(&config, &UrlState::from_href(&href).unwrap(), handshake(&location))
        .unwrap();

    assert_eq!(shell.mount.as_deref(), Some("workbench"));
    assert_eq!(shell.config.folder_uri, Some(target.uri().clone()));
    assert_eq!(shell.provider.workspace(), Some(&target));
    assert!(shell.provider.trusted());
}

#[test]
fn trust_follows_config() {
    let location = FakeLocation::at(PAGE);
    let config = WorkspaceConfig::from_json(r#"{"workspaceTrusted":false}"#).unwrap();
    let bootstrapper = Bootstrapper::new(RecordingShell::default());
    let shell = bootstrapper
        .bootstrap(&config, &UrlState::default(), handshake(&location))
        .unwrap();
    assert!(!shell.provider.trusted());
}

#[test]
fn provider_open_reuse_navigates_current_window() {
    let location = FakeLocation::at(PAGE);
    let provider = WorkspaceProvider::new(None, true, handshake(&location));
    let target = WorkspaceTarget::workspace(
        Uri::parse("https://repo.example.com/team.code-workspace").unwrap(),
    );

    let navigated = provider
        .open(Some(&target), OpenOptions { reuse: true })
        .unwrap();

    assert!(navigated);
    let href = location.href.borrow().clone();
    let state = UrlState::from_href(&href).unwrap();
    assert_eq!(state.query_target(), Some(target));
    assert!(location.opened.borrow().is_empty());
}

#[test]
fn provider_open_without_reuse_uses_new_window() {
    let location = FakeLocation::at(PAGE);
    let provider = WorkspaceProvider::new(None, true, handshake(&location));
    let target = WorkspaceTarget::folder(Uri::scheme_folder("localdir", "docs"));

    assert!(provider.open(Some(&target), OpenOptions::default()).unwrap());

    assert!(location.navigations.borrow().is_empty());
    let opened = location.opened.borrow();
    assert_eq!(opened.len(), 1);
    let state = UrlState::from_href(&opened[0]).unwrap();
    assert_eq!(state.local_target("localdir"), Some(target));
}
