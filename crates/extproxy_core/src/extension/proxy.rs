//! Extension proxy request/response state machine.
//!
//! # Responsibility
//! - Route registration and command requests from a document to a host
//!   binding, and route their asynchronous results back to the caller.
//! - Fan out extension events and live-data updates to registered callbacks.
//! - Forward lifecycle notifications on a best-effort basis.
//!
//! # Invariants
//! - Requests for URIs outside the proxy's set never reach the binding.
//! - Every request that returns `false` has already fired its failure callback.
//! - Pending registrations are keyed by activity; pending commands by
//!   `(activity, id)`. Requests for different activities never displace
//!   each other.
//! - The per-URI initialized latch only moves from false to true.
//! - No lock is held while a callback or binding call runs.

use crate::extension::binding::{BindingError, BindingResult, ExtensionBinding};
use crate::model::activity::{ActivityDescriptor, SessionDescriptor};
use crate::model::resource::ResourceHolder;
use crate::protocol::error_code::ExtensionErrorCode;
use crate::protocol::message::{
    command_id_of, exception_message, method_of, unknown_uri_message, FailureDocument,
    MESSAGE_FAILED_COMMAND, MESSAGE_INVALID_COMMAND_ID, MESSAGE_INVALID_SCHEMA,
    METHOD_COMMAND_FAILURE, METHOD_COMMAND_SUCCESS, METHOD_REGISTER_FAILURE,
    METHOD_REGISTER_SUCCESS,
};
use crate::runtime::host_ref::HostRef;
use log::{debug, info, warn};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Receives the parsed success document.
pub type SuccessCallback = Box<dyn FnOnce(&ActivityDescriptor, Value) + Send + 'static>;
/// Receives either a failure document built by the proxy or the extension's
/// own failure response.
pub type FailureCallback = Box<dyn FnOnce(&ActivityDescriptor, Value) + Send + 'static>;
/// Receives every event or live-data payload for one activity.
pub type EventCallback = Arc<dyn Fn(&ActivityDescriptor, &Value) + Send + Sync + 'static>;

/// Document-facing proxy contract.
///
/// Registrars and mediators only see this trait; result delivery belongs to
/// the concrete proxy that talks to a binding.
pub trait ExtensionProxy: Send + Sync {
    /// URIs this proxy serves.
    fn uris(&self) -> &BTreeSet<String>;

    /// Initializes the extension for `uri` once; later calls return the
    /// latched `true` without reaching the binding.
    fn initialize_extension(&self, uri: &str) -> bool;

    fn is_initialized(&self, uri: &str) -> bool;

    fn get_registration(
        &self,
        activity: &ActivityDescriptor,
        request: &Value,
        on_success: SuccessCallback,
        on_failure: FailureCallback,
    ) -> bool;

    fn invoke_command(
        &self,
        activity: &ActivityDescriptor,
        command: &Value,
        on_success: SuccessCallback,
        on_failure: FailureCallback,
    ) -> bool;

    fn register_event_callback(&self, activity: &ActivityDescriptor, callback: EventCallback);

    fn register_live_data_callback(&self, activity: &ActivityDescriptor, callback: EventCallback);

    fn on_registered(&self, activity: &ActivityDescriptor);
    fn on_unregistered(&self, activity: &ActivityDescriptor);
    fn on_session_started(&self, session: &SessionDescriptor);
    fn on_session_ended(&self, session: &SessionDescriptor);
    fn on_foreground(&self, activity: &ActivityDescriptor);
    fn on_background(&self, activity: &ActivityDescriptor);
    fn on_hidden(&self, activity: &ActivityDescriptor);
    fn on_resource_ready(&self, activity: &ActivityDescriptor, resource: &ResourceHolder);
}

struct PendingRequest {
    on_success: SuccessCallback,
    on_failure: FailureCallback,
}

#[derive(Default)]
struct ProxyState {
    initialized: BTreeSet<String>,
    registrations: HashMap<ActivityDescriptor, PendingRequest>,
    commands: HashMap<ActivityDescriptor, VecDeque<(i64, PendingRequest)>>,
    event_callbacks: HashMap<ActivityDescriptor, Vec<EventCallback>>,
    live_data_callbacks: HashMap<ActivityDescriptor, Vec<EventCallback>>,
}

/// Proxy bound to one host-owned [`ExtensionBinding`].
///
/// The proxy holds the binding weakly: once the host drops it, requests fail
/// with `kErrorException` and notifications become no-ops.
pub struct BoundExtensionProxy {
    uris: BTreeSet<String>,
    binding: HostRef<dyn ExtensionBinding>,
    state: Mutex<ProxyState>,
}

impl BoundExtensionProxy {
    pub fn new<I, S>(uris: I, binding: &Arc<dyn ExtensionBinding>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            uris: uris.into_iter().map(Into::into).collect(),
            binding: HostRef::new(binding),
            state: Mutex::new(ProxyState::default()),
        }
    }

    /// Delivers the asynchronous answer to a registration request.
    ///
    /// Returns `false` when no registration is pending for `activity`.
    pub fn registration_result(&self, activity: &ActivityDescriptor, response: &str) -> bool {
        let Some(pending) = self.lock_state().registrations.remove(activity) else {
            warn!(
                "event=registration_result module=proxy status=ignored reason=not_pending activity={activity}"
            );
            return false;
        };

        let doc = match serde_json::from_str::<Value>(response) {
            Ok(doc) => doc,
            Err(err) => {
                warn!(
                    "event=registration_result module=proxy status=error reason=parse activity={activity} error={err}"
                );
                (pending.on_failure)(activity, invalid_schema(activity));
                return true;
            }
        };

        match method_of(&doc) {
            Some(METHOD_REGISTER_SUCCESS) => {
                info!("event=registration_result module=proxy status=ok activity={activity}");
                (pending.on_success)(activity, doc);
            }
            Some(METHOD_REGISTER_FAILURE) => {
                info!("event=registration_result module=proxy status=denied activity={activity}");
                (pending.on_failure)(activity, doc);
            }
            other => {
                warn!(
                    "event=registration_result module=proxy status=error reason=method method={} activity={activity}",
                    other.unwrap_or("<missing>")
                );
                (pending.on_failure)(activity, invalid_schema(activity));
            }
        }
        true
    }

    /// Delivers the asynchronous answer to a command.
    ///
    /// The response is matched to the pending command with the same `id`; a
    /// response without a readable id resolves the oldest pending command of
    /// the activity. Returns `false` when no pending command matches.
    pub fn command_result(&self, activity: &ActivityDescriptor, response: &str) -> bool {
        let parsed = serde_json::from_str::<Value>(response);
        let response_id = parsed.as_ref().ok().and_then(command_id_of);

        let Some((id, pending)) = self.take_pending_command(activity, response_id) else {
            warn!(
                "event=command_result module=proxy status=ignored reason=not_pending activity={activity}"
            );
            return false;
        };

        let doc = match parsed {
            Ok(doc) => doc,
            Err(err) => {
                warn!(
                    "event=command_result module=proxy status=error reason=parse id={id} activity={activity} error={err}"
                );
                (pending.on_failure)(activity, failed_command(activity, id));
                return true;
            }
        };

        match method_of(&doc) {
            Some(METHOD_COMMAND_SUCCESS) => {
                debug!("event=command_result module=proxy status=ok id={id} activity={activity}");
                (pending.on_success)(activity, doc);
            }
            Some(METHOD_COMMAND_FAILURE) => {
                debug!(
                    "event=command_result module=proxy status=failed id={id} activity={activity}"
                );
                (pending.on_failure)(activity, doc);
            }
            other => {
                warn!(
                    "event=command_result module=proxy status=error reason=method method={} id={id} activity={activity}",
                    other.unwrap_or("<missing>")
                );
                (pending.on_failure)(activity, failed_command(activity, id));
            }
        }
        true
    }

    /// Dispatches one extension event to every callback of `activity`.
    ///
    /// Returns `false` without parsing when no callback is registered, and
    /// `false` when the payload is not JSON.
    pub fn invoke_extension_event_handler(
        &self,
        activity: &ActivityDescriptor,
        payload: &str,
    ) -> bool {
        let callbacks = self
            .lock_state()
            .event_callbacks
            .get(activity)
            .cloned()
            .unwrap_or_default();
        dispatch("extension_event", activity, payload, &callbacks)
    }

    /// Dispatches one live-data update to every callback of `activity`.
    pub fn invoke_live_data_update(&self, activity: &ActivityDescriptor, payload: &str) -> bool {
        let callbacks = self
            .lock_state()
            .live_data_callbacks
            .get(activity)
            .cloned()
            .unwrap_or_default();
        dispatch("live_data_update", activity, payload, &callbacks)
    }

    /// Number of requests still waiting for a result.
    pub fn pending_requests(&self) -> usize {
        let state = self.lock_state();
        state.registrations.len() + state.commands.values().map(VecDeque::len).sum::<usize>()
    }

    fn lock_state(&self) -> MutexGuard<'_, ProxyState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn call_binding<R>(
        &self,
        f: impl FnOnce(&dyn ExtensionBinding) -> BindingResult<R>,
    ) -> BindingResult<R> {
        self.binding
            .with(|binding| f(binding))
            .unwrap_or(Err(BindingError::Unavailable))
    }

    fn notify(
        &self,
        event: &str,
        target: &dyn std::fmt::Display,
        f: impl FnOnce(&dyn ExtensionBinding) -> BindingResult<()>,
    ) {
        match self.binding.with(|binding| f(binding)) {
            None | Some(Ok(())) => {}
            Some(Err(err)) => {
                warn!("event={event} module=proxy status=error target={target} error={err}");
            }
        }
    }

    fn take_pending_command(
        &self,
        activity: &ActivityDescriptor,
        id: Option<i64>,
    ) -> Option<(i64, PendingRequest)> {
        let mut state = self.lock_state();
        let queue = state.commands.get_mut(activity)?;
        let position = match id {
            Some(id) => queue.iter().position(|(pending_id, _)| *pending_id == id)?,
            None => 0,
        };
        let taken = queue.remove(position);
        if queue.is_empty() {
            state.commands.remove(activity);
        }
        taken
    }

    fn remove_pending_command(
        &self,
        activity: &ActivityDescriptor,
        id: i64,
    ) -> Option<PendingRequest> {
        let mut state = self.lock_state();
        let queue = state.commands.get_mut(activity)?;
        let position = queue
            .iter()
            .rposition(|(pending_id, _)| *pending_id == id)?;
        let taken = queue.remove(position).map(|(_, pending)| pending);
        if queue.is_empty() {
            state.commands.remove(activity);
        }
        taken
    }
}

impl ExtensionProxy for BoundExtensionProxy {
    fn uris(&self) -> &BTreeSet<String> {
        &self.uris
    }

    fn initialize_extension(&self, uri: &str) -> bool {
        if !self.uris.contains(uri) {
            warn!("event=extension_init module=proxy status=error reason=unknown_uri uri={uri}");
            return false;
        }
        if self.is_initialized(uri) {
            return true;
        }

        match self.call_binding(|binding| binding.initialize(uri)) {
            Ok(true) => {
                self.lock_state().initialized.insert(uri.to_string());
                info!("event=extension_init module=proxy status=ok uri={uri}");
                true
            }
            Ok(false) => {
                warn!("event=extension_init module=proxy status=rejected uri={uri}");
                false
            }
            Err(err) => {
                warn!("event=extension_init module=proxy status=error uri={uri} error={err}");
                false
            }
        }
    }

    fn is_initialized(&self, uri: &str) -> bool {
        self.lock_state().initialized.contains(uri)
    }

    fn get_registration(
        &self,
        activity: &ActivityDescriptor,
        request: &Value,
        on_success: SuccessCallback,
        on_failure: FailureCallback,
    ) -> bool {
        if !self.uris.contains(activity.uri()) {
            debug!("event=registration_request module=proxy status=rejected reason=unknown_uri activity={activity}");
            on_failure(
                activity,
                FailureDocument::registration(
                    activity.uri(),
                    ExtensionErrorCode::UnknownUri,
                    unknown_uri_message(activity.uri()),
                )
                .into_value(),
            );
            return false;
        }

        let previous = self.lock_state().registrations.insert(
            activity.clone(),
            PendingRequest {
                on_success,
                on_failure,
            },
        );
        if previous.is_some() {
            warn!("event=registration_request module=proxy status=replaced activity={activity}");
        }

        let serialized = request.to_string();
        match self.call_binding(|binding| binding.request_registration(activity, &serialized)) {
            Ok(()) => {
                debug!("event=registration_request module=proxy status=sent activity={activity}");
                true
            }
            Err(err) => {
                warn!("event=registration_request module=proxy status=error activity={activity} error={err}");
                if let Some(pending) = self.lock_state().registrations.remove(activity) {
                    (pending.on_failure)(
                        activity,
                        FailureDocument::registration(
                            activity.uri(),
                            ExtensionErrorCode::Exception,
                            exception_message(&err.to_string()),
                        )
                        .into_value(),
                    );
                }
                false
            }
        }
    }

    fn invoke_command(
        &self,
        activity: &ActivityDescriptor,
        command: &Value,
        on_success: SuccessCallback,
        on_failure: FailureCallback,
    ) -> bool {
        let Some(id) = command_id_of(command) else {
            debug!("event=command_request module=proxy status=rejected reason=invalid_id activity={activity}");
            on_failure(
                activity,
                FailureDocument::command(
                    activity.uri(),
                    None,
                    ExtensionErrorCode::InvalidMessage,
                    MESSAGE_INVALID_COMMAND_ID,
                )
                .into_value(),
            );
            return false;
        };

        if !self.uris.contains(activity.uri()) {
            debug!("event=command_request module=proxy status=rejected reason=unknown_uri id={id} activity={activity}");
            on_failure(
                activity,
                FailureDocument::unknown_uri(activity.uri(), Some(id)).into_value(),
            );
            return false;
        }

        self.lock_state()
            .commands
            .entry(activity.clone())
            .or_default()
            .push_back((
                id,
                PendingRequest {
                    on_success,
                    on_failure,
                },
            ));

        let serialized = command.to_string();
        match self.call_binding(|binding| binding.send_command(activity, &serialized)) {
            Ok(()) => {
                debug!("event=command_request module=proxy status=sent id={id} activity={activity}");
                true
            }
            Err(err) => {
                warn!("event=command_request module=proxy status=error id={id} activity={activity} error={err}");
                if let Some(pending) = self.remove_pending_command(activity, id) {
                    (pending.on_failure)(
                        activity,
                        FailureDocument::command(
                            activity.uri(),
                            Some(id),
                            ExtensionErrorCode::Exception,
                            exception_message(&err.to_string()),
                        )
                        .into_value(),
                    );
                }
                false
            }
        }
    }

    fn register_event_callback(&self, activity: &ActivityDescriptor, callback: EventCallback) {
        self.lock_state()
            .event_callbacks
            .entry(activity.clone())
            .or_default()
            .push(callback);
    }

    fn register_live_data_callback(&self, activity: &ActivityDescriptor, callback: EventCallback) {
        self.lock_state()
            .live_data_callbacks
            .entry(activity.clone())
            .or_default()
            .push(callback);
    }

    fn on_registered(&self, activity: &ActivityDescriptor) {
        self.notify("on_registered", activity, |binding| {
            binding.on_registered(activity)
        });
    }

    fn on_unregistered(&self, activity: &ActivityDescriptor) {
        // Dropped callbacks never fire; the activity is gone for the document.
        {
            let mut state = self.lock_state();
            state.registrations.remove(activity);
            state.commands.remove(activity);
            state.event_callbacks.remove(activity);
            state.live_data_callbacks.remove(activity);
        }
        self.notify("on_unregistered", activity, |binding| {
            binding.on_unregistered(activity)
        });
    }

    fn on_session_started(&self, session: &SessionDescriptor) {
        self.notify("on_session_started", &session.id(), |binding| {
            binding.on_session_started(session)
        });
    }

    fn on_session_ended(&self, session: &SessionDescriptor) {
        self.notify("on_session_ended", &session.id(), |binding| {
            binding.on_session_ended(session)
        });
    }

    fn on_foreground(&self, activity: &ActivityDescriptor) {
        self.notify("on_foreground", activity, |binding| {
            binding.on_foreground(activity)
        });
    }

    fn on_background(&self, activity: &ActivityDescriptor) {
        self.notify("on_background", activity, |binding| {
            binding.on_background(activity)
        });
    }

    fn on_hidden(&self, activity: &ActivityDescriptor) {
        self.notify("on_hidden", activity, |binding| binding.on_hidden(activity));
    }

    fn on_resource_ready(&self, activity: &ActivityDescriptor, resource: &ResourceHolder) {
        self.notify("on_resource_ready", activity, |binding| {
            binding.on_resource_ready(activity, resource)
        });
    }
}

fn dispatch(
    event: &str,
    activity: &ActivityDescriptor,
    payload: &str,
    callbacks: &[EventCallback],
) -> bool {
    if callbacks.is_empty() {
        debug!("event={event} module=proxy status=ignored reason=no_callbacks activity={activity}");
        return false;
    }
    let doc = match serde_json::from_str::<Value>(payload) {
        Ok(doc) => doc,
        Err(err) => {
            warn!("event={event} module=proxy status=error reason=parse activity={activity} error={err}");
            return false;
        }
    };
    for callback in callbacks {
        callback(activity, &doc);
    }
    true
}

fn invalid_schema(activity: &ActivityDescriptor) -> Value {
    FailureDocument::registration(
        activity.uri(),
        ExtensionErrorCode::InvalidExtensionSchema,
        MESSAGE_INVALID_SCHEMA,
    )
    .into_value()
}

fn failed_command(activity: &ActivityDescriptor, id: i64) -> Value {
    FailureDocument::command(
        activity.uri(),
        Some(id),
        ExtensionErrorCode::FailedCommand,
        MESSAGE_FAILED_COMMAND,
    )
    .into_value()
}

#[cfg(test)]
mod tests {
    use super::{BoundExtensionProxy, ExtensionProxy};
    use crate::extension::binding::{BindingError, BindingResult, ExtensionBinding};
    use crate::model::activity::{ActivityDescriptor, SessionDescriptor};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct StubBinding {
        init_calls: AtomicUsize,
        fail_sends: bool,
        sent: Mutex<Vec<String>>,
    }

    impl ExtensionBinding for StubBinding {
        fn initialize(&self, _uri: &str) -> BindingResult<bool> {
            self.init_calls.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        }

        fn request_registration(
            &self,
            _activity: &ActivityDescriptor,
            request: &str,
        ) -> BindingResult<()> {
            if self.fail_sends {
                return Err(BindingError::Failed("host threw".to_string()));
            }
            self.sent.lock().unwrap().push(request.to_string());
            Ok(())
        }

        fn send_command(&self, _activity: &ActivityDescriptor, command: &str) -> BindingResult<()> {
            if self.fail_sends {
                return Err(BindingError::Failed("host threw".to_string()));
            }
            self.sent.lock().unwrap().push(command.to_string());
            Ok(())
        }
    }

    type Outcome = Arc<Mutex<Vec<(bool, Value)>>>;

    fn recorder() -> (Outcome, super::SuccessCallback, super::FailureCallback) {
        let outcome: Outcome = Arc::default();
        let ok = Arc::clone(&outcome);
        let fail = Arc::clone(&outcome);
        (
            outcome,
            Box::new(move |_: &ActivityDescriptor, doc: Value| {
                ok.lock().unwrap().push((true, doc))
            }),
            Box::new(move |_: &ActivityDescriptor, doc: Value| {
                fail.lock().unwrap().push((false, doc))
            }),
        )
    }

    fn activity(uri: &str, id: &str) -> ActivityDescriptor {
        ActivityDescriptor::with_id(uri, SessionDescriptor::with_id("session"), id)
    }

    #[test]
    fn initialize_latches_and_skips_binding_afterwards() {
        let stub = Arc::new(StubBinding::default());
        let binding: Arc<dyn ExtensionBinding> = stub.clone();
        let proxy = BoundExtensionProxy::new(["custom:weather:1"], &binding);

        assert!(!proxy.is_initialized("custom:weather:1"));
        assert!(proxy.initialize_extension("custom:weather:1"));
        assert!(proxy.initialize_extension("custom:weather:1"));
        assert!(proxy.is_initialized("custom:weather:1"));
        assert_eq!(stub.init_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn binding_failure_during_registration_reports_exception() {
        let binding: Arc<dyn ExtensionBinding> = Arc::new(StubBinding {
            fail_sends: true,
            ..StubBinding::default()
        });
        let proxy = BoundExtensionProxy::new(["custom:weather:1"], &binding);
        let (outcome, ok, fail) = recorder();

        let accepted = proxy.get_registration(
            &activity("custom:weather:1", "a"),
            &json!({"method": "Register"}),
            ok,
            fail,
        );
        assert!(!accepted);
        let outcome = outcome.lock().unwrap();
        assert_eq!(outcome.len(), 1);
        assert!(!outcome[0].0);
        assert_eq!(outcome[0].1["errorCode"], 3);
        assert_eq!(proxy.pending_requests(), 0);
    }

    #[test]
    fn dropped_host_binding_fails_requests_and_silences_notifications() {
        let binding: Arc<dyn ExtensionBinding> = Arc::new(StubBinding::default());
        let proxy = BoundExtensionProxy::new(["custom:weather:1"], &binding);
        drop(binding);

        assert!(!proxy.initialize_extension("custom:weather:1"));
        let (outcome, ok, fail) = recorder();
        let target = activity("custom:weather:1", "a");
        assert!(!proxy.invoke_command(&target, &json!({"id": 1}), ok, fail));
        assert_eq!(outcome.lock().unwrap()[0].1["errorCode"], 3);
        assert_eq!(outcome.lock().unwrap()[0].1["id"], 1);

        proxy.on_registered(&target);
        proxy.on_hidden(&target);
    }

    #[test]
    fn concurrent_registrations_for_different_activities_stay_separate() {
        let binding: Arc<dyn ExtensionBinding> = Arc::new(StubBinding::default());
        let proxy = BoundExtensionProxy::new(["custom:weather:1"], &binding);
        let first = activity("custom:weather:1", "a");
        let second = activity("custom:weather:1", "b");
        let (first_outcome, ok, fail) = recorder();
        assert!(proxy.get_registration(&first, &json!({}), ok, fail));
        let (second_outcome, ok, fail) = recorder();
        assert!(proxy.get_registration(&second, &json!({}), ok, fail));
        assert_eq!(proxy.pending_requests(), 2);

        assert!(proxy.registration_result(&second, r#"{"method":"RegisterFailure"}"#));
        assert!(proxy.registration_result(&first, r#"{"method":"RegisterSuccess"}"#));

        assert!(first_outcome.lock().unwrap()[0].0);
        assert!(!second_outcome.lock().unwrap()[0].0);
        assert!(!proxy.registration_result(&first, r#"{"method":"RegisterSuccess"}"#));
    }

    #[test]
    fn command_results_match_by_id() {
        let binding: Arc<dyn ExtensionBinding> = Arc::new(StubBinding::default());
        let proxy = BoundExtensionProxy::new(["custom:weather:1"], &binding);
        let target = activity("custom:weather:1", "a");
        let (one, ok, fail) = recorder();
        assert!(proxy.invoke_command(&target, &json!({"id": 1}), ok, fail));
        let (two, ok, fail) = recorder();
        assert!(proxy.invoke_command(&target, &json!({"id": 2}), ok, fail));

        assert!(proxy.command_result(&target, r#"{"method":"CommandSuccess","id":2}"#));
        assert!(one.lock().unwrap().is_empty());
        assert!(two.lock().unwrap()[0].0);

        assert!(proxy.command_result(&target, "{not json"));
        let one = one.lock().unwrap();
        assert!(!one[0].0);
        assert_eq!(one[0].1["errorCode"], 4);
        assert_eq!(one[0].1["id"], 1);
        assert_eq!(proxy.pending_requests(), 0);
    }

    #[test]
    fn unregistering_drops_pending_and_event_callbacks() {
        let binding: Arc<dyn ExtensionBinding> = Arc::new(StubBinding::default());
        let proxy = BoundExtensionProxy::new(["custom:weather:1"], &binding);
        let target = activity("custom:weather:1", "a");
        let (outcome, ok, fail) = recorder();
        assert!(proxy.get_registration(&target, &json!({}), ok, fail));
        proxy.register_event_callback(&target, Arc::new(|_: &ActivityDescriptor, _: &Value| {}));

        proxy.on_unregistered(&target);
        assert_eq!(proxy.pending_requests(), 0);
        assert!(!proxy.invoke_extension_event_handler(&target, "{}"));
        assert!(!proxy.registration_result(&target, r#"{"method":"RegisterSuccess"}"#));
        assert!(outcome.lock().unwrap().is_empty());
    }
}
