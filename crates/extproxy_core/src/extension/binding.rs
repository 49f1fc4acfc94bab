//! Host-implemented extension binding contract.

use crate::model::activity::{ActivityDescriptor, SessionDescriptor};
use crate::model::resource::ResourceHolder;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type BindingResult<T> = Result<T, BindingError>;

/// Errors raised by a host binding call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    /// The host object behind the binding is gone.
    Unavailable,
    /// The host raised while handling the call.
    Failed(String),
}

impl Display for BindingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "extension binding is no longer available"),
            Self::Failed(message) => write!(f, "{message}"),
        }
    }
}

impl Error for BindingError {}

/// Concrete extension implementation living on the host side.
///
/// Requests are handed over as serialized JSON so a binding may forward them
/// to another process. Results come back asynchronously through
/// `BoundExtensionProxy::registration_result` and
/// `BoundExtensionProxy::command_result`, possibly before the forwarding call
/// returns.
pub trait ExtensionBinding: Send + Sync {
    /// Prepares the extension for `uri`. `Ok(true)` means ready.
    fn initialize(&self, uri: &str) -> BindingResult<bool>;

    fn request_registration(&self, activity: &ActivityDescriptor, request: &str)
        -> BindingResult<()>;

    fn send_command(&self, activity: &ActivityDescriptor, command: &str) -> BindingResult<()>;

    fn on_registered(&self, _activity: &ActivityDescriptor) -> BindingResult<()> {
        Ok(())
    }

    fn on_unregistered(&self, _activity: &ActivityDescriptor) -> BindingResult<()> {
        Ok(())
    }

    fn on_session_started(&self, _session: &SessionDescriptor) -> BindingResult<()> {
        Ok(())
    }

    fn on_session_ended(&self, _session: &SessionDescriptor) -> BindingResult<()> {
        Ok(())
    }

    fn on_foreground(&self, _activity: &ActivityDescriptor) -> BindingResult<()> {
        Ok(())
    }

    fn on_background(&self, _activity: &ActivityDescriptor) -> BindingResult<()> {
        Ok(())
    }

    fn on_hidden(&self, _activity: &ActivityDescriptor) -> BindingResult<()> {
        Ok(())
    }

    fn on_resource_ready(
        &self,
        _activity: &ActivityDescriptor,
        _resource: &ResourceHolder,
    ) -> BindingResult<()> {
        Ok(())
    }
}
