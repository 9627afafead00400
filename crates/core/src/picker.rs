//! Native directory/file picker bridge
//!
//! Browsers only honor `showDirectoryPicker()` / `showOpenFilePicker()` while
//! a user activation is live, which in practice means the call has to happen
//! inside the input event handler before anything is awaited. The bridge makes
//! that a type-level contract:
//!
//! - every open consumes a [`UserGesture`], which can't be cloned or sent
//! - [`NativePicker`] methods are synchronous and hand back a future, and the
//!   bridge calls them before returning its own future

use std::marker::PhantomData;

use futures::future::{self, FutureExt, LocalBoxFuture};

use crate::{Capabilities, Capability, Error, Result};

/// Proof that the caller is running synchronously inside a user-gesture handler
///
/// Consumed by the picker call it authorizes.
#[derive(Debug)]
pub struct UserGesture {
    _not_send: PhantomData<*const ()>,
}

impl UserGesture {
    /// Mint a token for the current event handler invocation
    ///
    /// Call only from the body of a click/keyboard handler, and pass the token
    /// on without awaiting anything first.
    pub fn inside_handler() -> Self {
        Self {
            _not_send: PhantomData,
        }
    }
}

/// Anything a picker returns has at least a name
pub trait NamedHandle {
    fn name(&self) -> String;
}

/// How a native picker call can fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerFailure {
    /// The user dismissed the dialog (`AbortError`)
    Aborted,
    Failed(String),
}

/// Platform picker APIs
pub trait NativePicker {
    type Directory: NamedHandle + 'static;
    type File: NamedHandle + 'static;

    /// Start the directory picker; must issue the native request before returning
    fn show_directory_picker(
        &self,
        gesture: UserGesture,
    ) -> LocalBoxFuture<'static, std::result::Result<Self::Directory, PickerFailure>>;

    /// Start the multi-file picker; must issue the native request before returning
    fn show_open_file_picker(
        &self,
        gesture: UserGesture,
    ) -> LocalBoxFuture<'static, std::result::Result<Vec<Self::File>, PickerFailure>>;
}

/// Feature-gated front of a [`NativePicker`]
///
/// Holds nothing between calls: handles are returned to the caller and never
/// persisted.
pub struct PickerBridge<P> {
    picker: P,
    capabilities: Capabilities,
}

impl<P: NativePicker> PickerBridge<P> {
    pub fn new(picker: P, capabilities: Capabilities) -> Self {
        Self {
            picker,
            capabilities,
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Ask the user for a directory
    ///
    /// The native picker has already been invoked when this returns.
    pub fn open_directory(
        &self,
        gesture: UserGesture,
    ) -> LocalBoxFuture<'static, Result<P::Directory>> {
        if !self.capabilities.supports(Capability::DirectoryPicker) {
            return future::ready(Err(Error::UnsupportedCapability(Capability::DirectoryPicker)))
                .boxed_local();
        }
        let request = self.picker.show_directory_picker(gesture);
        async move { request.await.map_err(into_error) }.boxed_local()
    }

    /// Ask the user for one or more files
    ///
    /// The native picker has already been invoked when this returns.
    pub fn open_files(&self, gesture: UserGesture) -> LocalBoxFuture<'static, Result<Vec<P::File>>> {
        if !self.capabilities.supports(Capability::FilePicker) {
            return future::ready(Err(Error::UnsupportedCapability(Capability::FilePicker)))
                .boxed_local();
        }
        let request = self.picker.show_open_file_picker(gesture);
        async move {
            let files = request.await.map_err(into_error)?;
            if files.is_empty() {
                // Some browsers resolve an empty selection instead of aborting
                return Err(Error::UserCancelled);
            }
            Ok(files)
        }
        .boxed_local()
    }
}

fn into_error(failure: PickerFailure) -> Error {
    match failure {
        PickerFailure::Aborted => Error::UserCancelled,
        PickerFailure::Failed(reason) => {
            tracing::error!(%reason, "native picker failed");
            Error::UnexpectedPickerFailure(reason)
        }
    }
}
