//! The open flow: picker, provider registration, reload
//!
//! One flow at a time. A trigger that arrives while another flow is running is
//! rejected rather than queued, and listeners (the trigger buttons) are told
//! when the in-flight state changes.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use folderbridge_protocol::{Uri, WorkspaceTarget};
use futures::future::{self, FutureExt, LocalBoxFuture};

use crate::picker::{NamedHandle, NativePicker, PickerBridge, UserGesture};
use crate::registrar::{Grant, ProviderProbe, ProviderRegistrar, Timer};
use crate::{Error, ReloadHandshake, Result};

/// User-visible messages
pub trait Notifier {
    fn alert(&self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    InFlight,
    /// Navigation issued; the page is about to unload. Terminal.
    Reloading,
}

type Listener = Box<dyn Fn(FlowState)>;

/// Single in-flight flag shared by every trigger
#[derive(Clone)]
pub struct FlowGuard {
    state: Rc<Cell<FlowState>>,
    listeners: Rc<RefCell<Vec<Listener>>>,
}

impl Default for FlowGuard {
    fn default() -> Self {
        Self {
            state: Rc::new(Cell::new(FlowState::Idle)),
            listeners: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl FlowGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FlowState {
        self.state.get()
    }

    /// Called on every transition
    pub fn on_change(&self, listener: impl Fn(FlowState) + 'static) {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    /// Claim the flag, or `None` if a flow is already running
    pub fn try_begin(&self) -> Option<FlowTicket> {
        if self.state.get() != FlowState::Idle {
            return None;
        }
        self.set(FlowState::InFlight);
        Some(FlowTicket {
            guard: Some(self.clone()),
        })
    }

    fn set(&self, state: FlowState) {
        self.state.set(state);
        for listener in self.listeners.borrow().iter() {
            listener(state);
        }
    }
}

/// Releases the in-flight flag when dropped
pub struct FlowTicket {
    guard: Option<FlowGuard>,
}

impl FlowTicket {
    /// Keep the flag claimed until the page unloads
    pub fn hold_for_reload(mut self) {
        if let Some(guard) = self.guard.take() {
            guard.set(FlowState::Reloading);
        }
    }

    /// Release on failure or cancellation; hold once navigation was issued
    fn finish(self, result: &Result<FlowOutcome>) {
        if matches!(result, Ok(FlowOutcome::Reloading(_))) {
            self.hold_for_reload();
        }
    }
}

impl Drop for FlowTicket {
    fn drop(&mut self) {
        if let Some(guard) = self.guard.take() {
            guard.set(FlowState::Idle);
        }
    }
}

/// How a flow ended without error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    /// Provider bound and navigation issued
    Reloading(WorkspaceTarget),
    /// The user dismissed the picker
    Cancelled,
}

/// Picker → registrar → reload, behind the in-flight guard
pub struct OpenFlow<P: NativePicker, T> {
    bridge: PickerBridge<P>,
    registrar: ProviderRegistrar<T>,
    probe: Rc<dyn ProviderProbe<P::Directory, P::File>>,
    handshake: Rc<ReloadHandshake>,
    notifier: Rc<dyn Notifier>,
    guard: FlowGuard,
}

impl<P, T> OpenFlow<P, T>
where
    P: NativePicker + 'static,
    T: Timer + 'static,
{
    pub fn new(
        bridge: PickerBridge<P>,
        registrar: ProviderRegistrar<T>,
        probe: Rc<dyn ProviderProbe<P::Directory, P::File>>,
        handshake: Rc<ReloadHandshake>,
        notifier: Rc<dyn Notifier>,
    ) -> Self {
        Self {
            bridge,
            registrar,
            probe,
            handshake,
            notifier,
            guard: FlowGuard::new(),
        }
    }

    pub fn guard(&self) -> &FlowGuard {
        &self.guard
    }

    /// Open a local folder as the workspace
    ///
    /// Must be called synchronously from the gesture handler that minted
    /// `gesture`; the picker is started before this returns.
    pub fn open_directory(
        self: &Rc<Self>,
        gesture: UserGesture,
    ) -> LocalBoxFuture<'static, Result<FlowOutcome>> {
        let Some(ticket) = self.guard.try_begin() else {
            return self.rejected();
        };
        let picked = self.bridge.open_directory(gesture);
        let this = Rc::clone(self);
        async move {
            let result = async {
                let directory = picked.await?;
                let name = directory.name();
                tracing::info!(directory = %name, "directory access granted");
                let target =
                    WorkspaceTarget::folder(Uri::scheme_folder(this.handshake.local_scheme(), &name));
                this.bind_and_reload(Grant::Directory(directory), target).await
            }
            .await;
            ticket.finish(&result);
            this.settle(result)
        }
        .boxed_local()
    }

    /// Open individual local files; the workspace becomes the scheme root
    ///
    /// Same gesture contract as [`Self::open_directory`].
    pub fn open_files(
        self: &Rc<Self>,
        gesture: UserGesture,
    ) -> LocalBoxFuture<'static, Result<FlowOutcome>> {
        let Some(ticket) = self.guard.try_begin() else {
            return self.rejected();
        };
        let picked = self.bridge.open_files(gesture);
        let this = Rc::clone(self);
        async move {
            let result = async {
                let files = picked.await?;
                tracing::info!(count = files.len(), "file access granted");
                let target =
                    WorkspaceTarget::folder(Uri::scheme_root(this.handshake.local_scheme()));
                this.bind_and_reload(Grant::Files(files), target).await
            }
            .await;
            ticket.finish(&result);
            this.settle(result)
        }
        .boxed_local()
    }

    async fn bind_and_reload(
        &self,
        grant: Grant<P::Directory, P::File>,
        target: WorkspaceTarget,
    ) -> Result<FlowOutcome> {
        self.registrar.register(self.probe.as_ref(), grant).await?;
        self.handshake.reload_into(Some(&target))?;
        Ok(FlowOutcome::Reloading(target))
    }

    fn rejected(&self) -> LocalBoxFuture<'static, Result<FlowOutcome>> {
        tracing::warn!("open requested while another is in flight");
        future::ready(Err(Error::FlowInFlight)).boxed_local()
    }

    /// Turn a finished flow into its outcome, telling the user about failures
    fn settle(&self, result: Result<FlowOutcome>) -> Result<FlowOutcome> {
        match result {
            Err(Error::UserCancelled) => {
                tracing::debug!("picker dismissed");
                Ok(FlowOutcome::Cancelled)
            }
            Err(err) => {
                tracing::warn!(error = %err, "open flow aborted");
                if let Some(message) = err.user_message() {
                    self.notifier.alert(&message);
                }
                Err(err)
            }
            ok => ok,
        }
    }
}
