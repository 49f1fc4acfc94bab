//! CLI smoke entry point.
//!
//! # Responsibility
//! - Wire one in-process extension through registrar, mediator and executor.
//! - Print a deterministic trace of one registration, command and event.

use extproxy_core::protocol::message::{command_id_of, command_success, event, registration_success};
use extproxy_core::{
    init_logging, ActivityDescriptor, BindingError, BindingResult, BoundExtensionProxy,
    ExtensionBinding, ExtensionExecutor, ExtensionMediator, ExtensionNotice, ExtensionRegistrar,
    RuntimeConfig,
};
use log::{info, warn};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, OnceLock, Weak};

const CLOCK_URI: &str = "demo:clock:1";

/// Extension that answers on the executor, as a remote extension would answer
/// from another thread.
struct ClockExtension {
    executor: Arc<ExtensionExecutor>,
    proxy: OnceLock<Weak<BoundExtensionProxy>>,
}

impl ClockExtension {
    fn reply(&self, f: impl FnOnce(&BoundExtensionProxy) + Send + 'static) -> BindingResult<()> {
        let proxy = self.proxy.get().cloned().ok_or(BindingError::Unavailable)?;
        self.executor.enqueue(move || {
            if let Some(proxy) = proxy.upgrade() {
                f(&proxy);
            }
        });
        Ok(())
    }
}

impl ExtensionBinding for ClockExtension {
    fn initialize(&self, uri: &str) -> BindingResult<bool> {
        Ok(uri == CLOCK_URI)
    }

    fn request_registration(
        &self,
        activity: &ActivityDescriptor,
        _request: &str,
    ) -> BindingResult<()> {
        let activity = activity.clone();
        self.reply(move |proxy| {
            let response = registration_success(CLOCK_URI, "clock-token", None);
            proxy.registration_result(&activity, &response.to_string());
        })
    }

    fn send_command(&self, activity: &ActivityDescriptor, command: &str) -> BindingResult<()> {
        let command: Value =
            serde_json::from_str(command).map_err(|err| BindingError::Failed(err.to_string()))?;
        let id = command_id_of(&command).ok_or_else(|| BindingError::Failed("no id".to_string()))?;
        let activity = activity.clone();
        self.reply(move |proxy| {
            let response = command_success(CLOCK_URI, id, Some(&json!({"time": "12:00"})));
            proxy.command_result(&activity, &response.to_string());
        })
    }

    fn on_registered(&self, activity: &ActivityDescriptor) -> BindingResult<()> {
        let activity = activity.clone();
        self.reply(move |proxy| {
            let tick = event(CLOCK_URI, "OnTick", Some(&json!({"seconds": 1})));
            proxy.invoke_extension_event_handler(&activity, &tick.to_string());
        })
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let config = RuntimeConfig::from_env()?;
    init_logging(&config.log_level, config.log_dir_str()?)?;
    info!("event=cli_start module=cli status=ok version={}", extproxy_core::core_version());

    let executor = Arc::new(ExtensionExecutor::new());
    let clock = Arc::new(ClockExtension {
        executor: Arc::clone(&executor),
        proxy: OnceLock::new(),
    });
    let binding: Arc<dyn ExtensionBinding> = clock.clone();
    let proxy = Arc::new(BoundExtensionProxy::new([CLOCK_URI], &binding));
    if clock.proxy.set(Arc::downgrade(&proxy)).is_err() {
        warn!("event=cli_wire module=cli status=error reason=proxy_already_bound");
    }

    let mut registrar = ExtensionRegistrar::new();
    registrar.register_proxy(proxy)?;

    let mediator = ExtensionMediator::new(
        Arc::new(registrar),
        Arc::new(|notice: ExtensionNotice| match notice {
            ExtensionNotice::Event { payload, .. } => println!("event {payload}"),
            ExtensionNotice::LiveData { payload, .. } => println!("live_data {payload}"),
        }),
    );

    let requested = mediator.load_extensions(&[CLOCK_URI], &BTreeMap::new());
    println!("registrations requested={requested}");
    executor.execute_pending();
    println!(
        "registration state={:?}",
        mediator.registration_state(CLOCK_URI)
    );

    mediator.invoke_command(CLOCK_URI, "GetTime", None, |outcome| match outcome {
        Ok(doc) => println!("command ok {doc}"),
        Err(doc) => println!("command failed {doc}"),
    });
    executor.execute_pending();

    mediator.finish();
    println!("session {} finished", mediator.session().id());
    Ok(())
}
