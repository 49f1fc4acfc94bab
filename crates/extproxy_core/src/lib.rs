//! Extension proxy runtime core.
//! Owns the registration/command protocol between documents and extensions.

pub mod config;
pub mod extension;
pub mod logging;
pub mod model;
pub mod protocol;
pub mod runtime;

pub use config::{ConfigError, RuntimeConfig};
pub use extension::binding::{BindingError, BindingResult, ExtensionBinding};
pub use extension::mediator::{
    CommandOutcome, DisplayState, ExtensionMediator, ExtensionNotice, NoticeSink,
    RegistrationState,
};
pub use extension::proxy::{
    BoundExtensionProxy, EventCallback, ExtensionProxy, FailureCallback, SuccessCallback,
};
pub use extension::registrar::{ExtensionProvider, ExtensionRegistrar, RegistrarError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::activity::{ActivityDescriptor, SessionDescriptor};
pub use model::resource::ResourceHolder;
pub use model::uri::{ExtensionUri, UriError};
pub use protocol::error_code::ExtensionErrorCode;
pub use protocol::message::FailureDocument;
pub use runtime::executor::ExtensionExecutor;
pub use runtime::handle::{Handle, HandleTable};
pub use runtime::host_ref::HostRef;

/// Minimal health-check API for host integration smoke tests.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
