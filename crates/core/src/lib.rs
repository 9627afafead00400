//! folderbridge-core
//!
//! Platform-agnostic half of the local-folder bridge. Everything that touches
//! the browser (pickers, timers, `location`, the DOM, the editor shell) sits
//! behind a trait here so the handshake can be driven and tested natively.

pub mod bootstrap;
pub mod capabilities;
pub mod flow;
pub mod handshake;
pub mod loader;
pub mod picker;
pub mod registrar;
pub mod resolver;

use std::time::Duration;

pub use bootstrap::{
    merge_config, trigger_controls, Bootstrapper, OpenOptions, ShellFactory, Trigger,
    WorkspaceProvider,
};
pub use capabilities::{Capabilities, Capability};
pub use flow::{FlowGuard, FlowOutcome, FlowState, FlowTicket, Notifier, OpenFlow};
pub use handshake::{Navigator, ReloadHandshake};
pub use loader::{load_config, ConfigSource, DEFAULT_CONFIG_URL};
pub use picker::{NamedHandle, NativePicker, PickerBridge, PickerFailure, UserGesture};
pub use registrar::{
    ActivationSignal, FileSystemProvider, Grant, ProviderProbe, ProviderRegistrar,
    RegistrarConfig, Timer,
};
pub use resolver::{local_scheme, resolve_workspace};

pub use folderbridge_protocol as protocol;

/// Errors that end an open flow or block boot
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("{0} is not supported by this browser")]
    UnsupportedCapability(Capability),
    #[error("picker dismissed")]
    UserCancelled,
    #[error("filesystem provider did not activate within {}ms", .waited.as_millis())]
    ProviderUnavailable { waited: Duration },
    #[error("picker failed: {0}")]
    UnexpectedPickerFailure(String),
    #[error("filesystem provider rejected the grant: {0}")]
    ProviderRejected(String),
    #[error("could not load workbench configuration: {0}")]
    ConfigFetchFailure(String),
    #[error("an open request is already in progress")]
    FlowInFlight,
    #[error("navigation failed: {0}")]
    Navigation(String),
    #[error("workbench already created")]
    AlreadyBootstrapped,
    #[error("workbench creation failed: {0}")]
    Shell(String),
}

impl Error {
    /// Text shown to the user, or `None` when the failure stays silent
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::UserCancelled | Self::FlowInFlight => None,
            Self::UnsupportedCapability(cap) => Some(format!(
                "{cap} is not supported in this browser. Try a Chromium-based browser."
            )),
            Self::ProviderUnavailable { .. } => Some(
                "The local filesystem provider did not start in time. Reload the page and try again."
                    .to_string(),
            ),
            other => Some(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
