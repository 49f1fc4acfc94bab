//! Document-side driver for one extension session.
//!
//! # Responsibility
//! - Resolve requested URIs, create activities and run registration.
//! - Issue commands with unique ids and hand results back to the document.
//! - Relay display-state, resource and teardown notifications.
//!
//! # Invariants
//! - One mediator owns exactly one session; `finish` ends it at most once.
//! - Commands only go to activities whose registration succeeded.
//! - No mediator lock is held while calling into a proxy.

use crate::extension::proxy::{EventCallback, ExtensionProxy};
use crate::extension::registrar::ExtensionProvider;
use crate::model::activity::{ActivityDescriptor, SessionDescriptor};
use crate::model::resource::ResourceHolder;
use crate::protocol::message::{command_request, registration_request};
use log::{debug, info, warn};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Registration progress for one URI.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationState {
    Pending,
    Registered { token: String },
    Denied(Value),
}

/// Host display state relayed to every registered activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    Foreground,
    Background,
    Hidden,
}

/// Extension traffic addressed to the document.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtensionNotice {
    Event {
        activity: ActivityDescriptor,
        payload: Value,
    },
    LiveData {
        activity: ActivityDescriptor,
        payload: Value,
    },
}

/// Receives [`ExtensionNotice`]s for the document.
pub type NoticeSink = Arc<dyn Fn(ExtensionNotice) + Send + Sync + 'static>;

/// Command outcome: `Ok(success document)` or `Err(failure document)`.
pub type CommandOutcome = Result<Value, Value>;

struct ActivityEntry {
    activity: ActivityDescriptor,
    proxy: Arc<dyn ExtensionProxy>,
    registration: RegistrationState,
}

#[derive(Default)]
struct MediatorState {
    activities: BTreeMap<String, ActivityEntry>,
    started: Vec<Arc<dyn ExtensionProxy>>,
    finished: bool,
}

/// Drives registration and command traffic for one session.
pub struct ExtensionMediator {
    provider: Arc<dyn ExtensionProvider>,
    session: SessionDescriptor,
    sink: NoticeSink,
    next_command_id: AtomicI64,
    state: Arc<Mutex<MediatorState>>,
}

impl ExtensionMediator {
    pub fn new(provider: Arc<dyn ExtensionProvider>, sink: NoticeSink) -> Self {
        Self::with_session(provider, SessionDescriptor::new(), sink)
    }

    pub fn with_session(
        provider: Arc<dyn ExtensionProvider>,
        session: SessionDescriptor,
        sink: NoticeSink,
    ) -> Self {
        Self {
            provider,
            session,
            sink,
            next_command_id: AtomicI64::new(1),
            state: Arc::new(Mutex::new(MediatorState::default())),
        }
    }

    pub fn session(&self) -> &SessionDescriptor {
        &self.session
    }

    /// Requests registration for every URI the provider knows.
    ///
    /// `settings` maps a URI to its registration settings document. URIs the
    /// provider does not know, or that are already loaded, are skipped.
    /// Returns the number of registration requests accepted by proxies.
    pub fn load_extensions(&self, uris: &[&str], settings: &BTreeMap<String, Value>) -> usize {
        let mut accepted = 0;
        for uri in uris.iter().map(|uri| uri.trim()) {
            if self.is_finished() {
                warn!("event=extension_load module=mediator status=ignored reason=finished uri={uri}");
                break;
            }
            if self.lock_state().activities.contains_key(uri) {
                continue;
            }
            if !self.provider.has_extension(uri) {
                debug!("event=extension_load module=mediator status=skipped reason=unknown_uri uri={uri}");
                continue;
            }
            let Some(proxy) = self.provider.get_extension(uri) else {
                warn!("event=extension_load module=mediator status=skipped reason=unavailable uri={uri}");
                continue;
            };

            self.start_session_once(&proxy);

            let activity = ActivityDescriptor::new(uri, self.session.clone());
            proxy.register_event_callback(&activity, self.notice_callback(true));
            proxy.register_live_data_callback(&activity, self.notice_callback(false));
            self.lock_state().activities.insert(
                uri.to_string(),
                ActivityEntry {
                    activity: activity.clone(),
                    proxy: Arc::clone(&proxy),
                    registration: RegistrationState::Pending,
                },
            );

            let request = registration_request(uri, settings.get(uri), None);
            let on_success = {
                let state = Arc::downgrade(&self.state);
                let proxy = Arc::clone(&proxy);
                Box::new(move |activity: &ActivityDescriptor, doc: Value| {
                    let token = doc
                        .get("token")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string();
                    if set_registration(&state, activity, RegistrationState::Registered { token }) {
                        info!("event=extension_registered module=mediator status=ok activity={activity}");
                        proxy.on_registered(activity);
                    }
                })
            };
            let on_failure = {
                let state = Arc::downgrade(&self.state);
                Box::new(move |activity: &ActivityDescriptor, doc: Value| {
                    warn!("event=extension_registered module=mediator status=denied activity={activity}");
                    set_registration(&state, activity, RegistrationState::Denied(doc));
                })
            };

            if proxy.get_registration(&activity, &request, on_success, on_failure) {
                accepted += 1;
            }
        }
        accepted
    }

    /// Sends one command to the registered activity of `uri`.
    ///
    /// Returns `false` without calling `on_result` when `uri` has no
    /// registered activity; otherwise mirrors the proxy result, and
    /// `on_result` fires exactly once (synchronously on rejection).
    pub fn invoke_command(
        &self,
        uri: &str,
        name: &str,
        payload: Option<&Value>,
        on_result: impl FnOnce(CommandOutcome) + Send + 'static,
    ) -> bool {
        let Some((activity, proxy)) = self.registered(uri.trim()) else {
            debug!("event=command_invoke module=mediator status=rejected reason=not_registered uri={uri}");
            return false;
        };

        let id = self.next_command_id.fetch_add(1, Ordering::SeqCst);
        let command = command_request(activity.uri(), id, name, payload);

        let slot = Arc::new(Mutex::new(Some(on_result)));
        let success_slot = Arc::clone(&slot);
        let on_success = Box::new(move |_: &ActivityDescriptor, doc: Value| {
            take_once(&success_slot, Ok(doc));
        });
        let on_failure = Box::new(move |_: &ActivityDescriptor, doc: Value| {
            take_once(&slot, Err(doc));
        });
        proxy.invoke_command(&activity, &command, on_success, on_failure)
    }

    /// Relays a display state change to every registered activity.
    pub fn on_display_state_change(&self, display_state: DisplayState) {
        for (activity, proxy) in self.registered_activities() {
            match display_state {
                DisplayState::Foreground => proxy.on_foreground(&activity),
                DisplayState::Background => proxy.on_background(&activity),
                DisplayState::Hidden => proxy.on_hidden(&activity),
            }
        }
    }

    /// Tells the extension behind `uri` that a host resource is ready.
    pub fn on_resource_ready(&self, uri: &str, resource: &ResourceHolder) -> bool {
        let Some((activity, proxy)) = self.registered(uri.trim()) else {
            return false;
        };
        proxy.on_resource_ready(&activity, resource);
        true
    }

    /// Unregisters every live activity and ends the session. Idempotent.
    pub fn finish(&self) {
        let (entries, started) = {
            let mut state = self.lock_state();
            if state.finished {
                return;
            }
            state.finished = true;
            let entries: Vec<_> = state
                .activities
                .values()
                .filter(|entry| !matches!(entry.registration, RegistrationState::Denied(_)))
                .map(|entry| (entry.activity.clone(), Arc::clone(&entry.proxy)))
                .collect();
            (entries, std::mem::take(&mut state.started))
        };

        for (activity, proxy) in &entries {
            proxy.on_unregistered(activity);
        }
        for proxy in &started {
            proxy.on_session_ended(&self.session);
        }
        info!(
            "event=session_finish module=mediator status=ok session={} activities={}",
            self.session.id(),
            entries.len()
        );
    }

    pub fn is_finished(&self) -> bool {
        self.lock_state().finished
    }

    pub fn registration_state(&self, uri: &str) -> Option<RegistrationState> {
        self.lock_state()
            .activities
            .get(uri.trim())
            .map(|entry| entry.registration.clone())
    }

    pub fn activity(&self, uri: &str) -> Option<ActivityDescriptor> {
        self.lock_state()
            .activities
            .get(uri.trim())
            .map(|entry| entry.activity.clone())
    }

    fn lock_state(&self) -> MutexGuard<'_, MediatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn start_session_once(&self, proxy: &Arc<dyn ExtensionProxy>) {
        {
            let mut state = self.lock_state();
            if state.started.iter().any(|known| Arc::ptr_eq(known, proxy)) {
                return;
            }
            state.started.push(Arc::clone(proxy));
        }
        proxy.on_session_started(&self.session);
    }

    fn notice_callback(&self, event: bool) -> EventCallback {
        let sink = Arc::clone(&self.sink);
        Arc::new(move |activity: &ActivityDescriptor, payload: &Value| {
            let activity = activity.clone();
            let payload = payload.clone();
            sink(if event {
                ExtensionNotice::Event { activity, payload }
            } else {
                ExtensionNotice::LiveData { activity, payload }
            });
        })
    }

    fn registered(&self, uri: &str) -> Option<(ActivityDescriptor, Arc<dyn ExtensionProxy>)> {
        let state = self.lock_state();
        if state.finished {
            return None;
        }
        let entry = state.activities.get(uri)?;
        match entry.registration {
            RegistrationState::Registered { .. } => {
                Some((entry.activity.clone(), Arc::clone(&entry.proxy)))
            }
            _ => None,
        }
    }

    fn registered_activities(&self) -> Vec<(ActivityDescriptor, Arc<dyn ExtensionProxy>)> {
        let state = self.lock_state();
        if state.finished {
            return Vec::new();
        }
        state
            .activities
            .values()
            .filter(|entry| matches!(entry.registration, RegistrationState::Registered { .. }))
            .map(|entry| (entry.activity.clone(), Arc::clone(&entry.proxy)))
            .collect()
    }
}

impl Drop for ExtensionMediator {
    fn drop(&mut self) {
        self.finish();
    }
}

/// Updates the registration state of a still-pending activity. Returns
/// whether the update applied.
fn set_registration(
    state: &Weak<Mutex<MediatorState>>,
    activity: &ActivityDescriptor,
    registration: RegistrationState,
) -> bool {
    let Some(state) = state.upgrade() else {
        return false;
    };
    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    if state.finished {
        return false;
    }
    match state.activities.get_mut(activity.uri()) {
        Some(entry)
            if entry.activity == *activity
                && entry.registration == RegistrationState::Pending =>
        {
            entry.registration = registration;
            true
        }
        _ => false,
    }
}

fn take_once<F>(slot: &Mutex<Option<F>>, outcome: CommandOutcome)
where
    F: FnOnce(CommandOutcome),
{
    let callback = slot.lock().unwrap_or_else(PoisonError::into_inner).take();
    if let Some(callback) = callback {
        callback(outcome);
    }
}
