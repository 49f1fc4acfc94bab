#![allow(dead_code)]

use extproxy_core::{
    ActivityDescriptor, BindingError, BindingResult, ExtensionBinding, FailureCallback,
    ResourceHolder, SessionDescriptor, SuccessCallback,
};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Host binding double that records every call it receives.
#[derive(Default)]
pub struct RecordingBinding {
    pub init_calls: AtomicUsize,
    pub reject_init: AtomicBool,
    pub fail_calls: AtomicBool,
    pub calls: Mutex<Vec<String>>,
    pub requests: Mutex<Vec<(ActivityDescriptor, String)>>,
}

impl RecordingBinding {
    pub fn shared() -> (Arc<Self>, Arc<dyn ExtensionBinding>) {
        let binding = Arc::new(Self::default());
        let erased: Arc<dyn ExtensionBinding> = binding.clone();
        (binding, erased)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<(ActivityDescriptor, String)> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) -> BindingResult<()> {
        if self.fail_calls.load(Ordering::SeqCst) {
            return Err(BindingError::Failed("binding threw".to_string()));
        }
        self.calls.lock().unwrap().push(call.into());
        Ok(())
    }
}

impl ExtensionBinding for RecordingBinding {
    fn initialize(&self, _uri: &str) -> BindingResult<bool> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        Ok(!self.reject_init.load(Ordering::SeqCst))
    }

    fn request_registration(
        &self,
        activity: &ActivityDescriptor,
        request: &str,
    ) -> BindingResult<()> {
        self.record("request_registration")?;
        self.requests
            .lock()
            .unwrap()
            .push((activity.clone(), request.to_string()));
        Ok(())
    }

    fn send_command(&self, activity: &ActivityDescriptor, command: &str) -> BindingResult<()> {
        self.record("send_command")?;
        self.requests
            .lock()
            .unwrap()
            .push((activity.clone(), command.to_string()));
        Ok(())
    }

    fn on_registered(&self, _activity: &ActivityDescriptor) -> BindingResult<()> {
        self.record("on_registered")
    }

    fn on_unregistered(&self, _activity: &ActivityDescriptor) -> BindingResult<()> {
        self.record("on_unregistered")
    }

    fn on_session_started(&self, _session: &SessionDescriptor) -> BindingResult<()> {
        self.record("on_session_started")
    }

    fn on_session_ended(&self, _session: &SessionDescriptor) -> BindingResult<()> {
        self.record("on_session_ended")
    }

    fn on_foreground(&self, _activity: &ActivityDescriptor) -> BindingResult<()> {
        self.record("on_foreground")
    }

    fn on_background(&self, _activity: &ActivityDescriptor) -> BindingResult<()> {
        self.record("on_background")
    }

    fn on_hidden(&self, _activity: &ActivityDescriptor) -> BindingResult<()> {
        self.record("on_hidden")
    }

    fn on_resource_ready(
        &self,
        _activity: &ActivityDescriptor,
        resource: &ResourceHolder,
    ) -> BindingResult<()> {
        self.record(format!("on_resource_ready:{}", resource.resource_id()))
    }
}

/// `(succeeded, document)` pairs in callback order.
pub type Outcomes = Arc<Mutex<Vec<(bool, Value)>>>;

pub fn outcome_recorder() -> (Outcomes, SuccessCallback, FailureCallback) {
    let outcomes: Outcomes = Arc::default();
    let on_success = Arc::clone(&outcomes);
    let on_failure = Arc::clone(&outcomes);
    (
        outcomes,
        Box::new(move |_: &ActivityDescriptor, doc: Value| {
            on_success.lock().unwrap().push((true, doc));
        }),
        Box::new(move |_: &ActivityDescriptor, doc: Value| {
            on_failure.lock().unwrap().push((false, doc));
        }),
    )
}

pub fn activity(uri: &str) -> ActivityDescriptor {
    ActivityDescriptor::new(uri, SessionDescriptor::with_id("test-session"))
}
