//! FFI use-case API for host-facing calls.
//!
//! # Responsibility
//! - Expose extension proxies to the host through opaque integer handles.
//! - Queue proxy-to-host traffic for polling instead of calling back into the
//!   host runtime.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - A released handle behaves like an unknown one: calls return `false` or
//!   empty results.
//! - The handle table lock is never held while a proxy runs.

use extproxy_core::protocol::message::{MESSAGE_INVALID_COMMAND_ID, MESSAGE_INVALID_REQUEST};
use extproxy_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    ActivityDescriptor, BindingResult, BoundExtensionProxy, ExtensionBinding, ExtensionErrorCode,
    ExtensionProxy, FailureDocument, Handle, HandleTable, ResourceHolder, SessionDescriptor,
};
use log::warn;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

static PROXIES: OnceLock<Mutex<HandleTable<ProxyEntry>>> = OnceLock::new();

/// Activity triple as passed by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfiActivity {
    pub uri: String,
    pub session_id: String,
    pub activity_id: String,
}

impl FfiActivity {
    fn to_descriptor(&self) -> ActivityDescriptor {
        ActivityDescriptor::with_id(
            self.uri.as_str(),
            SessionDescriptor::with_id(self.session_id.as_str()),
            self.activity_id.as_str(),
        )
    }

    fn from_descriptor(activity: &ActivityDescriptor) -> Self {
        Self {
            uri: activity.uri().to_string(),
            session_id: activity.session().id().to_string(),
            activity_id: activity.activity_id().to_string(),
        }
    }
}

/// Proxy-to-host message waiting to be polled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// `initialize|register|command|registered|unregistered|session_started|
    /// session_ended|foreground|background|hidden|resource_ready`.
    pub kind: String,
    pub uri: Option<String>,
    pub session_id: String,
    pub activity_id: Option<String>,
    /// Serialized request, or the resource id for `resource_ready`.
    pub payload: Option<String>,
}

/// Document-facing result produced by a proxy callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyResultEnvelope {
    /// `registration|command|event|live_data`.
    pub kind: String,
    pub ok: bool,
    pub activity: FfiActivity,
    /// Serialized JSON document.
    pub document: String,
}

/// Host binding that records outbound calls for polling.
#[derive(Default)]
struct QueuedBinding {
    outbound: Mutex<VecDeque<OutboundMessage>>,
}

impl QueuedBinding {
    fn push(&self, message: OutboundMessage) -> BindingResult<()> {
        lock(&self.outbound).push_back(message);
        Ok(())
    }

    fn push_activity(
        &self,
        kind: &str,
        activity: &ActivityDescriptor,
        payload: Option<String>,
    ) -> BindingResult<()> {
        self.push(OutboundMessage {
            kind: kind.to_string(),
            uri: Some(activity.uri().to_string()),
            session_id: activity.session().id().to_string(),
            activity_id: Some(activity.activity_id().to_string()),
            payload,
        })
    }

    fn push_session(&self, kind: &str, session: &SessionDescriptor) -> BindingResult<()> {
        self.push(OutboundMessage {
            kind: kind.to_string(),
            uri: None,
            session_id: session.id().to_string(),
            activity_id: None,
            payload: None,
        })
    }
}

impl ExtensionBinding for QueuedBinding {
    fn initialize(&self, uri: &str) -> BindingResult<bool> {
        self.push(OutboundMessage {
            kind: "initialize".to_string(),
            uri: Some(uri.to_string()),
            session_id: String::new(),
            activity_id: None,
            payload: None,
        })?;
        Ok(true)
    }

    fn request_registration(
        &self,
        activity: &ActivityDescriptor,
        request: &str,
    ) -> BindingResult<()> {
        self.push_activity("register", activity, Some(request.to_string()))
    }

    fn send_command(&self, activity: &ActivityDescriptor, command: &str) -> BindingResult<()> {
        self.push_activity("command", activity, Some(command.to_string()))
    }

    fn on_registered(&self, activity: &ActivityDescriptor) -> BindingResult<()> {
        self.push_activity("registered", activity, None)
    }

    fn on_unregistered(&self, activity: &ActivityDescriptor) -> BindingResult<()> {
        self.push_activity("unregistered", activity, None)
    }

    fn on_session_started(&self, session: &SessionDescriptor) -> BindingResult<()> {
        self.push_session("session_started", session)
    }

    fn on_session_ended(&self, session: &SessionDescriptor) -> BindingResult<()> {
        self.push_session("session_ended", session)
    }

    fn on_foreground(&self, activity: &ActivityDescriptor) -> BindingResult<()> {
        self.push_activity("foreground", activity, None)
    }

    fn on_background(&self, activity: &ActivityDescriptor) -> BindingResult<()> {
        self.push_activity("background", activity, None)
    }

    fn on_hidden(&self, activity: &ActivityDescriptor) -> BindingResult<()> {
        self.push_activity("hidden", activity, None)
    }

    fn on_resource_ready(
        &self,
        activity: &ActivityDescriptor,
        resource: &ResourceHolder,
    ) -> BindingResult<()> {
        self.push_activity(
            "resource_ready",
            activity,
            Some(resource.resource_id().to_string()),
        )
    }
}

struct ProxyEntry {
    proxy: Arc<BoundExtensionProxy>,
    // Owns the binding on behalf of the host; the proxy only holds it weakly.
    binding: Arc<QueuedBinding>,
    results: Arc<Mutex<VecDeque<ProxyResultEnvelope>>>,
}

impl ProxyEntry {
    fn result_sink(
        &self,
        kind: &'static str,
        ok: bool,
    ) -> Box<dyn FnOnce(&ActivityDescriptor, Value) + Send + 'static> {
        let results = Arc::clone(&self.results);
        Box::new(move |activity: &ActivityDescriptor, doc: Value| {
            push_result(&results, kind, ok, activity, &doc);
        })
    }
}

/// Minimal health-check API for host smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Exposes core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Creates a proxy serving `uris` and returns its handle.
///
/// # FFI contract
/// - Never fails; an empty `uris` list yields a proxy that rejects every
///   request with `kErrorUnknownURI`.
#[flutter_rust_bridge::frb(sync)]
pub fn proxy_create(uris: Vec<String>) -> u64 {
    let binding = Arc::new(QueuedBinding::default());
    let erased: Arc<dyn ExtensionBinding> = binding.clone();
    let entry = ProxyEntry {
        proxy: Arc::new(BoundExtensionProxy::new(
            uris.iter().map(|uri| uri.trim().to_string()),
            &erased,
        )),
        binding,
        results: Arc::default(),
    };
    lock(proxies()).insert(Arc::new(entry))
}

/// Releases a proxy handle. Returns `false` for unknown handles.
#[flutter_rust_bridge::frb(sync)]
pub fn proxy_release(handle: u64) -> bool {
    lock(proxies()).release(handle).is_some()
}

#[flutter_rust_bridge::frb(sync)]
pub fn proxy_initialize(handle: u64, uri: String) -> bool {
    with_entry(handle, |entry| entry.proxy.initialize_extension(uri.trim())).unwrap_or(false)
}

/// Starts a registration; the failure result is queued when this returns `false`.
///
/// # FFI contract
/// - Unparseable `request_json` queues a `kErrorInvalidMessage` failure.
#[flutter_rust_bridge::frb(sync)]
pub fn proxy_get_registration(handle: u64, activity: FfiActivity, request_json: String) -> bool {
    with_entry(handle, |entry| {
        let activity = activity.to_descriptor();
        let Some(request) = parse_json("proxy_get_registration", &request_json) else {
            let failure = FailureDocument::registration(
                activity.uri(),
                ExtensionErrorCode::InvalidMessage,
                MESSAGE_INVALID_REQUEST,
            );
            push_result(&entry.results, "registration", false, &activity, &failure.into_value());
            return false;
        };
        entry.proxy.get_registration(
            &activity,
            &request,
            entry.result_sink("registration", true),
            entry.result_sink("registration", false),
        )
    })
    .unwrap_or(false)
}

#[flutter_rust_bridge::frb(sync)]
pub fn proxy_registration_result(handle: u64, activity: FfiActivity, response_json: String) -> bool {
    with_entry(handle, |entry| {
        entry
            .proxy
            .registration_result(&activity.to_descriptor(), &response_json)
    })
    .unwrap_or(false)
}

/// Sends a command; the failure result is queued when this returns `false`.
///
/// # FFI contract
/// - Unparseable `command_json` has no readable id and queues a
///   `kErrorInvalidMessage` failure without one.
#[flutter_rust_bridge::frb(sync)]
pub fn proxy_invoke_command(handle: u64, activity: FfiActivity, command_json: String) -> bool {
    with_entry(handle, |entry| {
        let activity = activity.to_descriptor();
        let Some(command) = parse_json("proxy_invoke_command", &command_json) else {
            let failure = FailureDocument::command(
                activity.uri(),
                None,
                ExtensionErrorCode::InvalidMessage,
                MESSAGE_INVALID_COMMAND_ID,
            );
            push_result(&entry.results, "command", false, &activity, &failure.into_value());
            return false;
        };
        entry.proxy.invoke_command(
            &activity,
            &command,
            entry.result_sink("command", true),
            entry.result_sink("command", false),
        )
    })
    .unwrap_or(false)
}

#[flutter_rust_bridge::frb(sync)]
pub fn proxy_command_result(handle: u64, activity: FfiActivity, response_json: String) -> bool {
    with_entry(handle, |entry| {
        entry
            .proxy
            .command_result(&activity.to_descriptor(), &response_json)
    })
    .unwrap_or(false)
}

/// Routes extension events for `activity` into the polled result queue.
#[flutter_rust_bridge::frb(sync)]
pub fn proxy_subscribe_events(handle: u64, activity: FfiActivity) -> bool {
    with_entry(handle, |entry| {
        let results = Arc::clone(&entry.results);
        entry.proxy.register_event_callback(
            &activity.to_descriptor(),
            Arc::new(move |activity: &ActivityDescriptor, doc: &Value| {
                push_result(&results, "event", true, activity, doc);
            }),
        );
    })
    .is_some()
}

/// Routes live-data updates for `activity` into the polled result queue.
#[flutter_rust_bridge::frb(sync)]
pub fn proxy_subscribe_live_data(handle: u64, activity: FfiActivity) -> bool {
    with_entry(handle, |entry| {
        let results = Arc::clone(&entry.results);
        entry.proxy.register_live_data_callback(
            &activity.to_descriptor(),
            Arc::new(move |activity: &ActivityDescriptor, doc: &Value| {
                push_result(&results, "live_data", true, activity, doc);
            }),
        );
    })
    .is_some()
}

#[flutter_rust_bridge::frb(sync)]
pub fn proxy_event(handle: u64, activity: FfiActivity, payload_json: String) -> bool {
    with_entry(handle, |entry| {
        entry
            .proxy
            .invoke_extension_event_handler(&activity.to_descriptor(), &payload_json)
    })
    .unwrap_or(false)
}

#[flutter_rust_bridge::frb(sync)]
pub fn proxy_live_data_update(handle: u64, activity: FfiActivity, payload_json: String) -> bool {
    with_entry(handle, |entry| {
        entry
            .proxy
            .invoke_live_data_update(&activity.to_descriptor(), &payload_json)
    })
    .unwrap_or(false)
}

/// Forwards one activity lifecycle notification.
///
/// `notification` is one of `registered|unregistered|foreground|background|hidden`.
/// Returns `false` for unknown handles or notifications.
#[flutter_rust_bridge::frb(sync)]
pub fn proxy_lifecycle(handle: u64, activity: FfiActivity, notification: String) -> bool {
    with_entry(handle, |entry| {
        let activity = activity.to_descriptor();
        match notification.trim() {
            "registered" => entry.proxy.on_registered(&activity),
            "unregistered" => entry.proxy.on_unregistered(&activity),
            "foreground" => entry.proxy.on_foreground(&activity),
            "background" => entry.proxy.on_background(&activity),
            "hidden" => entry.proxy.on_hidden(&activity),
            other => {
                warn!("event=ffi_lifecycle module=ffi status=error reason=unknown notification={other}");
                return false;
            }
        }
        true
    })
    .unwrap_or(false)
}

#[flutter_rust_bridge::frb(sync)]
pub fn proxy_session(handle: u64, session_id: String, started: bool) -> bool {
    with_entry(handle, |entry| {
        let session = SessionDescriptor::with_id(session_id);
        if started {
            entry.proxy.on_session_started(&session);
        } else {
            entry.proxy.on_session_ended(&session);
        }
    })
    .is_some()
}

#[flutter_rust_bridge::frb(sync)]
pub fn proxy_resource_ready(handle: u64, activity: FfiActivity, resource_id: String) -> bool {
    with_entry(handle, |entry| {
        entry
            .proxy
            .on_resource_ready(&activity.to_descriptor(), &ResourceHolder::new(resource_id));
    })
    .is_some()
}

/// Drains proxy-to-host messages in send order.
#[flutter_rust_bridge::frb(sync)]
pub fn proxy_poll_outbound(handle: u64) -> Vec<OutboundMessage> {
    with_entry(handle, |entry| lock(&entry.binding.outbound).drain(..).collect())
        .unwrap_or_default()
}

/// Drains document-facing results in delivery order.
#[flutter_rust_bridge::frb(sync)]
pub fn proxy_poll_results(handle: u64) -> Vec<ProxyResultEnvelope> {
    with_entry(handle, |entry| lock(&entry.results).drain(..).collect()).unwrap_or_default()
}

fn proxies() -> &'static Mutex<HandleTable<ProxyEntry>> {
    PROXIES.get_or_init(|| Mutex::new(HandleTable::new()))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn with_entry<R>(handle: Handle, f: impl FnOnce(&ProxyEntry) -> R) -> Option<R> {
    let entry = lock(proxies()).get(handle)?;
    Some(f(&entry))
}

fn parse_json(call: &str, raw: &str) -> Option<Value> {
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("event={call} module=ffi status=error reason=parse error={err}");
            None
        }
    }
}

fn push_result(
    results: &Mutex<VecDeque<ProxyResultEnvelope>>,
    kind: &str,
    ok: bool,
    activity: &ActivityDescriptor,
    doc: &Value,
) {
    lock(results).push_back(ProxyResultEnvelope {
        kind: kind.to_string(),
        ok,
        activity: FfiActivity::from_descriptor(activity),
        document: doc.to_string(),
    });
}
