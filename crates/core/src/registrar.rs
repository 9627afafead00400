//! Handing a granted handle to the filesystem provider
//!
//! The provider activates on its own schedule and the page has no event for
//! it, so the registrar waits for it with a bounded poll: check the presence
//! signal, sleep one interval, repeat until it shows up or the ceiling passes.
//! A provider may also announce itself through an [`ActivationSignal`], which
//! cuts the current sleep short.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use folderbridge_protocol::WorkspaceConfig;
use futures::channel::oneshot;
use futures::future::{self, FutureExt, LocalBoxFuture, Shared};

use crate::{Error, Result};

/// Config option overriding the poll interval
pub const POLL_INTERVAL_OPTION: &str = "pollIntervalMs";
/// Config option overriding the wait ceiling
pub const CEILING_OPTION: &str = "providerTimeoutMs";

/// Clock and sleep for the event loop the registrar runs on
#[async_trait(?Send)]
pub trait Timer {
    /// Monotonic time since an arbitrary origin
    fn now(&self) -> Duration;

    async fn sleep(&self, duration: Duration);
}

/// What the user granted
pub enum Grant<D, F> {
    Directory(D),
    Files(Vec<F>),
}

/// The external filesystem provider, once it is active
pub trait FileSystemProvider<D, F> {
    /// Bind granted handles; for a directory this is `setDirectoryHandle`
    fn bind(&self, grant: Grant<D, F>) -> Result<()>;
}

/// The well-known presence signal
pub trait ProviderProbe<D, F> {
    /// The provider, if it has activated
    fn lookup(&self) -> Option<Rc<dyn FileSystemProvider<D, F>>>;

    /// Resolves when the provider announces itself, for probes that can push
    fn activation(&self) -> Option<LocalBoxFuture<'static, ()>> {
        None
    }
}

type Provider<D, F> = Rc<dyn FileSystemProvider<D, F>>;

/// One-shot notification that the provider has activated
///
/// Resolved at most once; later notifications are ignored.
pub struct ActivationSignal<D, F> {
    sender: RefCell<Option<oneshot::Sender<()>>>,
    provider: RefCell<Option<Provider<D, F>>>,
    activated: Shared<oneshot::Receiver<()>>,
}

impl<D, F> ActivationSignal<D, F> {
    pub fn new() -> Self {
        let (tx, rx) = oneshot::channel();
        Self {
            sender: RefCell::new(Some(tx)),
            provider: RefCell::new(None),
            activated: rx.shared(),
        }
    }

    /// Record the provider and wake every waiter. Returns `false` if the
    /// signal had already fired.
    pub fn notify(&self, provider: Provider<D, F>) -> bool {
        let Some(tx) = self.sender.borrow_mut().take() else {
            tracing::warn!("provider activation reported twice; keeping the first");
            return false;
        };
        *self.provider.borrow_mut() = Some(provider);
        let _ = tx.send(());
        true
    }

    pub fn is_activated(&self) -> bool {
        self.provider.borrow().is_some()
    }
}

impl<D, F> Default for ActivationSignal<D, F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D, F> ProviderProbe<D, F> for ActivationSignal<D, F> {
    fn lookup(&self) -> Option<Provider<D, F>> {
        self.provider.borrow().clone()
    }

    fn activation(&self) -> Option<LocalBoxFuture<'static, ()>> {
        Some(self.activated.clone().map(|_| ()).boxed_local())
    }
}

/// Poll interval and ceiling for the provider wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrarConfig {
    pub poll_interval: Duration,
    pub ceiling: Duration,
}

impl Default for RegistrarConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            ceiling: Duration::from_millis(5000),
        }
    }
}

impl RegistrarConfig {
    /// Defaults, overridden by `pollIntervalMs` / `providerTimeoutMs`
    pub fn from_config(config: &WorkspaceConfig) -> Self {
        let defaults = Self::default();
        Self {
            poll_interval: config
                .option_u64(POLL_INTERVAL_OPTION)
                .filter(|ms| *ms > 0)
                .map_or(defaults.poll_interval, Duration::from_millis),
            ceiling: config
                .option_u64(CEILING_OPTION)
                .map_or(defaults.ceiling, Duration::from_millis),
        }
    }
}

/// Waits for the provider and binds grants into it
pub struct ProviderRegistrar<T> {
    timer: T,
    config: RegistrarConfig,
}

impl<T: Timer> ProviderRegistrar<T> {
    pub fn new(timer: T, config: RegistrarConfig) -> Self {
        Self { timer, config }
    }

    pub fn config(&self) -> RegistrarConfig {
        self.config
    }

    /// Wait until `probe` reports a provider, or fail once the ceiling passes
    ///
    /// Never sleeps past the ceiling.
    pub async fn wait_for_provider<D, F>(
        &self,
        probe: &dyn ProviderProbe<D, F>,
    ) -> Result<Provider<D, F>> {
        let started = self.timer.now();
        let mut polls = 0u32;

        loop {
            if let Some(provider) = probe.lookup() {
                tracing::info!(polls, "filesystem provider available");
                return Ok(provider);
            }

            let waited = self.timer.now().saturating_sub(started);
            if waited >= self.config.ceiling {
                tracing::warn!(
                    waited_ms = u64::try_from(waited.as_millis()).unwrap_or(u64::MAX),
                    "filesystem provider never activated"
                );
                return Err(Error::ProviderUnavailable { waited });
            }

            let step = self.config.poll_interval.min(self.config.ceiling - waited);
            match probe.activation() {
                Some(activated) => {
                    future::select(self.timer.sleep(step), activated).await;
                }
                None => self.timer.sleep(step).await,
            }
            polls += 1;
            tracing::debug!(polls, "waiting for filesystem provider");
        }
    }

    /// Wait for the provider, then bind `grant` into it
    ///
    /// Nothing is bound on timeout.
    pub async fn register<D, F>(
        &self,
        probe: &dyn ProviderProbe<D, F>,
        grant: Grant<D, F>,
    ) -> Result<()> {
        let provider = self.wait_for_provider(probe).await?;
        provider.bind(grant)
    }
}
