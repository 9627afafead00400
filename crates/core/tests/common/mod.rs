//! Common test utilities: scripted stand-ins for the browser collaborators
#![allow(dead_code)] // Not every test file uses every mock

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use folderbridge_core::{
    Capabilities, FileSystemProvider, Grant, NamedHandle, NativePicker, Navigator, Notifier,
    OpenFlow, PickerBridge, PickerFailure, ProviderProbe, ProviderRegistrar, RegistrarConfig,
    ReloadHandshake, Result, Timer, UserGesture,
};
use futures::future::{self, FutureExt, LocalBoxFuture};

pub const PAGE: &str = "https://edit.example.com/";

/// Timer on tokio's clock, so `start_paused` tests run on virtual time
pub struct TokioTimer {
    origin: tokio::time::Instant,
}

impl TokioTimer {
    pub fn start() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

#[async_trait(?Send)]
impl Timer for TokioTimer {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

pub struct MockDir(pub String);

impl NamedHandle for MockDir {
    fn name(&self) -> String {
        self.0.clone()
    }
}

pub struct MockFile(pub String);

impl NamedHandle for MockFile {
    fn name(&self) -> String {
        self.0.clone()
    }
}

/// What the next picker call yields
#[derive(Clone)]
pub enum Script {
    Dir(&'static str),
    Files(Vec<&'static str>),
    Abort,
    Fail(&'static str),
}

pub struct MockPicker {
    pub calls: Rc<Cell<u32>>,
    script: Script,
}

impl NativePicker for MockPicker {
    type Directory = MockDir;
    type File = MockFile;

    fn show_directory_picker(
        &self,
        _gesture: UserGesture,
    ) -> LocalBoxFuture<'static, std::result::Result<MockDir, PickerFailure>> {
        self.calls.set(self.calls.get() + 1);
        let outcome = match self.script.clone() {
            Script::Dir(name) => Ok(MockDir(name.to_string())),
            Script::Files(_) => Err(PickerFailure::Failed("script mismatch".to_string())),
            Script::Abort => Err(PickerFailure::Aborted),
            Script::Fail(reason) => Err(PickerFailure::Failed(reason.to_string())),
        };
        future::ready(outcome).boxed_local()
    }

    fn show_open_file_picker(
        &self,
        _gesture: UserGesture,
    ) -> LocalBoxFuture<'static, std::result::Result<Vec<MockFile>, PickerFailure>> {
        self.calls.set(self.calls.get() + 1);
        let outcome = match self.script.clone() {
            Script::Files(names) => Ok(names
                .into_iter()
                .map(|n| MockFile(n.to_string()))
                .collect()),
            Script::Dir(_) => Err(PickerFailure::Failed("script mismatch".to_string())),
            Script::Abort => Err(PickerFailure::Aborted),
            Script::Fail(reason) => Err(PickerFailure::Failed(reason.to_string())),
        };
        future::ready(outcome).boxed_local()
    }
}

/// Filesystem provider that records what was bound
#[derive(Default)]
pub struct MockProvider {
    pub bound: RefCell<Vec<String>>,
}

impl FileSystemProvider<MockDir, MockFile> for MockProvider {
    fn bind(&self, grant: Grant<MockDir, MockFile>) -> Result<()> {
        let mut bound = self.bound.borrow_mut();
        match grant {
            Grant::Directory(dir) => bound.push(format!("dir:{}", dir.0)),
            Grant::Files(files) => bound.extend(files.into_iter().map(|f| format!("file:{}", f.0))),
        }
        Ok(())
    }
}

/// Presence signal that appears after a fixed delay, or never
pub struct TimedProbe {
    origin: tokio::time::Instant,
    appears_after: Option<Duration>,
    provider: Rc<MockProvider>,
}

impl ProviderProbe<MockDir, MockFile> for TimedProbe {
    fn lookup(&self) -> Option<Rc<dyn FileSystemProvider<MockDir, MockFile>>> {
        let due = self.appears_after?;
        if self.origin.elapsed() >= due {
            let provider: Rc<dyn FileSystemProvider<MockDir, MockFile>> = self.provider.clone();
            Some(provider)
        } else {
            None
        }
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub alerts: RefCell<Vec<String>>,
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }
}

/// `location` stand-in
#[derive(Default)]
pub struct FakeLocation {
    pub href: RefCell<String>,
    pub navigations: RefCell<Vec<String>>,
    pub reloads: Cell<u32>,
    pub opened: RefCell<Vec<String>>,
}

impl FakeLocation {
    pub fn at(href: &str) -> Rc<Self> {
        let location = Rc::new(Self::default());
        *location.href.borrow_mut() = href.to_string();
        location
    }
}

impl Navigator for FakeLocation {
    fn href(&self) -> Result<String> {
        Ok(self.href.borrow().clone())
    }

    fn assign(&self, href: &str) -> Result<()> {
        self.navigations.borrow_mut().push(href.to_string());
        *self.href.borrow_mut() = href.to_string();
        Ok(())
    }

    fn reload(&self) -> Result<()> {
        self.reloads.set(self.reloads.get() + 1);
        Ok(())
    }

    fn open_window(&self, href: &str) -> Result<bool> {
        self.opened.borrow_mut().push(href.to_string());
        Ok(true)
    }
}

/// Everything a flow test inspects afterwards
pub struct Harness {
    pub flow: Rc<OpenFlow<MockPicker, TokioTimer>>,
    pub picker_calls: Rc<Cell<u32>>,
    pub provider: Rc<MockProvider>,
    pub notifier: Rc<RecordingNotifier>,
    pub location: Rc<FakeLocation>,
}

pub struct HarnessBuilder {
    capabilities: Capabilities,
    script: Script,
    appears_after: Option<Duration>,
    registrar: RegistrarConfig,
}

impl HarnessBuilder {
    pub fn new(script: Script) -> Self {
        Self {
            capabilities: Capabilities::all(),
            script,
            appears_after: Some(Duration::ZERO),
            registrar: RegistrarConfig {
                poll_interval: Duration::from_millis(100),
                ceiling: Duration::from_millis(500),
            },
        }
    }

    pub fn capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn provider_after(mut self, delay: Option<Duration>) -> Self {
        self.appears_after = delay;
        self
    }

    pub fn build(self) -> Harness {
        let picker_calls = Rc::new(Cell::new(0));
        let picker = MockPicker {
            calls: Rc::clone(&picker_calls),
            script: self.script,
        };
        let provider = Rc::new(MockProvider::default());
        let probe = Rc::new(TimedProbe {
            origin: tokio::time::Instant::now(),
            appears_after: self.appears_after,
            provider: Rc::clone(&provider),
        });
        let notifier = Rc::new(RecordingNotifier::default());
        let location = FakeLocation::at(PAGE);
        let handshake = Rc::new(ReloadHandshake::new(location.clone(), "localdir"));

        let flow = Rc::new(OpenFlow::new(
            PickerBridge::new(picker, self.capabilities),
            ProviderRegistrar::new(TokioTimer::start(), self.registrar),
            probe,
            handshake,
            notifier.clone(),
        ));

        Harness {
            flow,
            picker_calls,
            provider,
            notifier,
            location,
        }
    }
}
