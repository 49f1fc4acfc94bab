mod common;

use common::{activity, outcome_recorder, RecordingBinding};
use extproxy_core::protocol::message::{command_failure, live_data_update, registration_failure};
use extproxy_core::{ActivityDescriptor, BoundExtensionProxy, ExtensionErrorCode, ExtensionProxy};
use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

const WEATHER: &str = "custom:weather:1";
const CLOCK: &str = "custom:clock:1";

#[test]
fn command_for_unknown_uri_fails_with_stable_document() {
    let (stub, binding) = RecordingBinding::shared();
    let proxy = BoundExtensionProxy::new([WEATHER], &binding);
    let (outcomes, ok, fail) = outcome_recorder();

    let accepted = proxy.invoke_command(
        &activity(CLOCK),
        &json!({"method": "Command", "id": 5, "name": "Tick"}),
        ok,
        fail,
    );

    assert!(!accepted);
    let outcomes = outcomes.lock().unwrap();
    assert_eq!(outcomes.len(), 1);
    let (succeeded, doc) = &outcomes[0];
    assert!(!succeeded);
    assert_eq!(doc["errorCode"], ExtensionErrorCode::UnknownUri.code());
    assert_eq!(doc["errorCode"], 2);
    assert_eq!(doc["uri"], CLOCK);
    assert_eq!(doc["errorMessage"], "Unknown URI custom:clock:1");
    assert_eq!(doc["id"], 5);
    assert!(stub.calls().is_empty());
}

#[test]
fn registration_for_unknown_uri_never_reaches_binding() {
    let (stub, binding) = RecordingBinding::shared();
    let proxy = BoundExtensionProxy::new([WEATHER], &binding);
    let (outcomes, ok, fail) = outcome_recorder();

    assert!(!proxy.get_registration(&activity(CLOCK), &json!({}), ok, fail));

    let outcomes = outcomes.lock().unwrap();
    assert_eq!(outcomes[0].1["errorCode"], 2);
    assert!(outcomes[0].1.get("id").is_none());
    assert!(stub.calls().is_empty());
}

#[test]
fn initialize_extension_calls_binding_once_after_success() {
    let (stub, binding) = RecordingBinding::shared();
    let proxy = BoundExtensionProxy::new([WEATHER], &binding);

    for _ in 0..3 {
        assert!(proxy.initialize_extension(WEATHER));
    }
    assert_eq!(stub.init_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn rejected_initialization_is_retried_until_it_succeeds() {
    let (stub, binding) = RecordingBinding::shared();
    stub.reject_init.store(true, Ordering::SeqCst);
    let proxy = BoundExtensionProxy::new([WEATHER], &binding);

    assert!(!proxy.initialize_extension(WEATHER));
    assert!(!proxy.is_initialized(WEATHER));

    stub.reject_init.store(false, Ordering::SeqCst);
    assert!(proxy.initialize_extension(WEATHER));
    stub.reject_init.store(true, Ordering::SeqCst);
    assert!(proxy.initialize_extension(WEATHER));
    assert_eq!(stub.init_calls.load(Ordering::SeqCst), 2);
}

#[test]
fn command_without_numeric_id_fails_before_uri_check() {
    let (stub, binding) = RecordingBinding::shared();
    let proxy = BoundExtensionProxy::new([WEATHER], &binding);

    for (uri, command) in [
        (WEATHER, json!({"method": "Command"})),
        (WEATHER, json!({"method": "Command", "id": "7"})),
        (CLOCK, json!({"method": "Command"})),
    ] {
        let (outcomes, ok, fail) = outcome_recorder();
        assert!(!proxy.invoke_command(&activity(uri), &command, ok, fail));
        let outcomes = outcomes.lock().unwrap();
        assert_eq!(
            outcomes[0].1["errorCode"],
            ExtensionErrorCode::InvalidMessage.code()
        );
        assert_eq!(outcomes[0].1["uri"], uri);
    }
    assert!(stub.calls().is_empty());
}

#[test]
fn unparsable_results_route_to_failure_with_protocol_codes() {
    let (_stub, binding) = RecordingBinding::shared();
    let proxy = BoundExtensionProxy::new([WEATHER], &binding);
    let target = activity(WEATHER);

    let (registration, ok, fail) = outcome_recorder();
    assert!(proxy.get_registration(&target, &json!({"method": "Register"}), ok, fail));
    assert!(proxy.registration_result(&target, "{ definitely not json"));
    assert_eq!(
        registration.lock().unwrap()[0],
        (
            false,
            json!({
                "errorCode": ExtensionErrorCode::InvalidExtensionSchema.code(),
                "errorMessage": "Invalid extension schema",
                "uri": WEATHER
            })
        )
    );

    let (command, ok, fail) = outcome_recorder();
    assert!(proxy.invoke_command(&target, &json!({"id": 11}), ok, fail));
    assert!(proxy.command_result(&target, "]["));
    let command = command.lock().unwrap();
    assert!(!command[0].0);
    assert_eq!(
        command[0].1["errorCode"],
        ExtensionErrorCode::FailedCommand.code()
    );
    assert_eq!(command[0].1["id"], 11);
}

#[test]
fn register_success_passes_exact_document() {
    let (stub, binding) = RecordingBinding::shared();
    let proxy = BoundExtensionProxy::new([WEATHER], &binding);
    let target = activity(WEATHER);
    let (outcomes, ok, fail) = outcome_recorder();

    assert!(proxy.get_registration(&target, &json!({"method": "Register", "uri": WEATHER}), ok, fail));
    let forwarded: Value = serde_json::from_str(&stub.requests()[0].1).unwrap();
    assert_eq!(forwarded["method"], "Register");

    let response = json!({
        "version": "1.0",
        "method": "RegisterSuccess",
        "uri": WEATHER,
        "token": "tok-1",
        "schema": {"events": [{"name": "OnRain"}]}
    });
    assert!(proxy.registration_result(&target, &response.to_string()));
    assert_eq!(outcomes.lock().unwrap()[0], (true, response));
}

#[test]
fn any_other_registration_method_is_failure() {
    let (_stub, binding) = RecordingBinding::shared();
    let proxy = BoundExtensionProxy::new([WEATHER], &binding);

    let denied = registration_failure(WEATHER, 500, "denied");
    let target = activity(WEATHER);
    let (outcomes, ok, fail) = outcome_recorder();
    assert!(proxy.get_registration(&target, &json!({}), ok, fail));
    assert!(proxy.registration_result(&target, &denied.to_string()));
    assert_eq!(outcomes.lock().unwrap()[0], (false, denied));

    for response in [
        json!({"method": "registersuccess"}),
        json!({"method": 1}),
        json!({"uri": WEATHER}),
    ] {
        let target = activity(WEATHER);
        let (outcomes, ok, fail) = outcome_recorder();
        assert!(proxy.get_registration(&target, &json!({}), ok, fail));
        assert!(proxy.registration_result(&target, &response.to_string()));
        assert!(!outcomes.lock().unwrap()[0].0, "{response} must fail");
    }
}

#[test]
fn command_success_and_failure_are_distinguished_by_method() {
    let (_stub, binding) = RecordingBinding::shared();
    let proxy = BoundExtensionProxy::new([WEATHER], &binding);
    let target = activity(WEATHER);

    let (success, ok, fail) = outcome_recorder();
    assert!(proxy.invoke_command(&target, &json!({"id": 1}), ok, fail));
    let response = json!({"method": "CommandSuccess", "id": 1, "result": 42});
    assert!(proxy.command_result(&target, &response.to_string()));
    assert_eq!(success.lock().unwrap()[0], (true, response));

    let (failure, ok, fail) = outcome_recorder();
    assert!(proxy.invoke_command(&target, &json!({"id": 2}), ok, fail));
    let response = command_failure(WEATHER, 2, 9, "no");
    assert!(proxy.command_result(&target, &response.to_string()));
    assert_eq!(failure.lock().unwrap()[0], (false, response));

    assert!(!proxy.command_result(&target, r#"{"method":"CommandSuccess","id":3}"#));
}

#[test]
fn event_without_callbacks_returns_false_even_for_garbage() {
    let (_stub, binding) = RecordingBinding::shared();
    let proxy = BoundExtensionProxy::new([WEATHER], &binding);
    let target = activity(WEATHER);

    assert!(!proxy.invoke_extension_event_handler(&target, "not json at all"));
    assert!(!proxy.invoke_live_data_update(&target, "{}"));
}

#[test]
fn events_fan_out_to_every_callback_of_the_activity() {
    let (_stub, binding) = RecordingBinding::shared();
    let proxy = BoundExtensionProxy::new([WEATHER], &binding);
    let target = activity(WEATHER);
    let other = activity(WEATHER);
    let seen = Arc::new(Mutex::new(Vec::<String>::new()));

    for label in ["first", "second"] {
        let seen = Arc::clone(&seen);
        proxy.register_event_callback(
            &target,
            Arc::new(move |_: &ActivityDescriptor, payload: &Value| {
                seen.lock()
                    .unwrap()
                    .push(format!("{label}:{}", payload["name"]));
            }),
        );
    }

    assert!(proxy.invoke_extension_event_handler(&target, r#"{"method":"Event","name":"OnRain"}"#));
    assert!(!proxy.invoke_extension_event_handler(&target, "{broken"));
    assert!(!proxy.invoke_extension_event_handler(&other, r#"{"name":"OnRain"}"#));
    assert_eq!(
        *seen.lock().unwrap(),
        vec!["first:\"OnRain\"".to_string(), "second:\"OnRain\"".to_string()]
    );
}

#[test]
fn live_data_updates_use_their_own_callbacks() {
    let (_stub, binding) = RecordingBinding::shared();
    let proxy = BoundExtensionProxy::new([WEATHER], &binding);
    let target = activity(WEATHER);
    let updates = Arc::new(Mutex::new(Vec::new()));
    {
        let updates = Arc::clone(&updates);
        proxy.register_live_data_callback(
            &target,
            Arc::new(move |_: &ActivityDescriptor, payload: &Value| {
                updates.lock().unwrap().push(payload.clone());
            }),
        );
    }

    assert!(!proxy.invoke_extension_event_handler(&target, "{}"));
    let update = live_data_update(WEATHER, "Forecast", &[json!({"op": "set", "value": 21})]);
    assert!(proxy.invoke_live_data_update(&target, &update.to_string()));
    let updates = updates.lock().unwrap();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0]["name"], "Forecast");
    assert_eq!(updates[0]["operations"][0]["value"], 21);
}

#[test]
fn lifecycle_notifications_swallow_binding_errors() {
    let (stub, binding) = RecordingBinding::shared();
    let proxy = BoundExtensionProxy::new([WEATHER], &binding);
    let target = activity(WEATHER);

    proxy.on_session_started(target.session());
    proxy.on_registered(&target);
    proxy.on_foreground(&target);
    stub.fail_calls.store(true, Ordering::SeqCst);
    proxy.on_background(&target);
    proxy.on_hidden(&target);
    stub.fail_calls.store(false, Ordering::SeqCst);
    proxy.on_resource_ready(&target, &extproxy_core::ResourceHolder::new("surface-7"));
    proxy.on_unregistered(&target);
    proxy.on_session_ended(target.session());

    assert_eq!(
        stub.calls(),
        vec![
            "on_session_started",
            "on_registered",
            "on_foreground",
            "on_resource_ready:surface-7",
            "on_unregistered",
            "on_session_ended",
        ]
    );
}

#[test]
fn synchronous_result_inside_forwarding_call_is_honored() {
    use extproxy_core::{BindingResult, ExtensionBinding};
    use std::sync::OnceLock;

    struct EchoBinding {
        proxy: OnceLock<Arc<BoundExtensionProxy>>,
    }

    impl ExtensionBinding for EchoBinding {
        fn initialize(&self, _uri: &str) -> BindingResult<bool> {
            Ok(true)
        }

        fn request_registration(
            &self,
            activity: &ActivityDescriptor,
            _request: &str,
        ) -> BindingResult<()> {
            if let Some(proxy) = self.proxy.get() {
                proxy.registration_result(activity, r#"{"method":"RegisterSuccess","token":"t"}"#);
            }
            Ok(())
        }

        fn send_command(&self, _activity: &ActivityDescriptor, _command: &str) -> BindingResult<()> {
            Ok(())
        }
    }

    let echo = Arc::new(EchoBinding {
        proxy: OnceLock::new(),
    });
    let binding: Arc<dyn ExtensionBinding> = echo.clone();
    let proxy = Arc::new(BoundExtensionProxy::new([WEATHER], &binding));
    let _ = echo.proxy.set(Arc::clone(&proxy));

    let (outcomes, ok, fail) = outcome_recorder();
    assert!(proxy.get_registration(&activity(WEATHER), &json!({}), ok, fail));
    assert!(outcomes.lock().unwrap()[0].0);
    assert_eq!(proxy.pending_requests(), 0);
}
