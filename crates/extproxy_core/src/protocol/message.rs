//! Extension message documents.
//!
//! Documents are plain `serde_json::Value` trees on the wire. Builders here
//! produce the shapes the proxy and mediator emit; readers extract the few
//! fields routing depends on.

use crate::protocol::error_code::ExtensionErrorCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Protocol version stamped on outbound requests.
pub const PROTOCOL_VERSION: &str = "1.0";

pub const METHOD_REGISTER: &str = "Register";
pub const METHOD_REGISTER_SUCCESS: &str = "RegisterSuccess";
pub const METHOD_REGISTER_FAILURE: &str = "RegisterFailure";
pub const METHOD_COMMAND: &str = "Command";
pub const METHOD_COMMAND_SUCCESS: &str = "CommandSuccess";
pub const METHOD_COMMAND_FAILURE: &str = "CommandFailure";
pub const METHOD_EVENT: &str = "Event";
pub const METHOD_LIVE_DATA_UPDATE: &str = "LiveDataUpdate";

pub const MESSAGE_INVALID_COMMAND_ID: &str = "Invalid or missing command id";
pub const MESSAGE_INVALID_SCHEMA: &str = "Invalid extension schema";
pub const MESSAGE_FAILED_COMMAND: &str = "Failed command";
pub const MESSAGE_INVALID_REQUEST: &str = "Invalid request document";

/// Failure document delivered to failure callbacks.
///
/// `id` is present only for command failures with a known command id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureDocument {
    pub error_code: ExtensionErrorCode,
    pub error_message: String,
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl FailureDocument {
    pub fn registration(
        uri: impl Into<String>,
        error_code: ExtensionErrorCode,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            error_code,
            error_message: error_message.into(),
            uri: uri.into(),
            id: None,
        }
    }

    pub fn command(
        uri: impl Into<String>,
        id: Option<i64>,
        error_code: ExtensionErrorCode,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            error_code,
            error_message: error_message.into(),
            uri: uri.into(),
            id,
        }
    }

    pub fn unknown_uri(uri: &str, id: Option<i64>) -> Self {
        Self::command(
            uri,
            id,
            ExtensionErrorCode::UnknownUri,
            unknown_uri_message(uri),
        )
    }

    /// Converts into the wire document.
    pub fn into_value(self) -> Value {
        json!(self)
    }
}

pub fn unknown_uri_message(uri: &str) -> String {
    format!("Unknown URI {uri}")
}

pub fn exception_message(detail: &str) -> String {
    format!("Extension binding raised: {detail}")
}

/// Builds a `Register` request.
pub fn registration_request(uri: &str, settings: Option<&Value>, flags: Option<&Value>) -> Value {
    let mut doc = envelope(METHOD_REGISTER, uri);
    if let Some(settings) = settings {
        doc.insert("settings".to_string(), settings.clone());
    }
    if let Some(flags) = flags {
        doc.insert("flags".to_string(), flags.clone());
    }
    Value::Object(doc)
}

/// Builds a `RegisterSuccess` response, as an extension would send it.
pub fn registration_success(uri: &str, token: &str, environment: Option<&Value>) -> Value {
    let mut doc = envelope(METHOD_REGISTER_SUCCESS, uri);
    doc.insert("token".to_string(), json!(token));
    doc.insert(
        "environment".to_string(),
        environment.cloned().unwrap_or_else(|| json!({})),
    );
    Value::Object(doc)
}

/// Builds a `RegisterFailure` response with the extension's own code/message.
pub fn registration_failure(uri: &str, code: i64, message: &str) -> Value {
    let mut doc = envelope(METHOD_REGISTER_FAILURE, uri);
    doc.insert("code".to_string(), json!(code));
    doc.insert("message".to_string(), json!(message));
    Value::Object(doc)
}

/// Builds a `Command` request.
pub fn command_request(uri: &str, id: i64, name: &str, payload: Option<&Value>) -> Value {
    let mut doc = envelope(METHOD_COMMAND, uri);
    doc.insert("id".to_string(), json!(id));
    doc.insert("name".to_string(), json!(name));
    doc.insert(
        "payload".to_string(),
        payload.cloned().unwrap_or_else(|| json!({})),
    );
    Value::Object(doc)
}

pub fn command_success(uri: &str, id: i64, result: Option<&Value>) -> Value {
    let mut doc = envelope(METHOD_COMMAND_SUCCESS, uri);
    doc.insert("id".to_string(), json!(id));
    if let Some(result) = result {
        doc.insert("result".to_string(), result.clone());
    }
    Value::Object(doc)
}

pub fn command_failure(uri: &str, id: i64, code: i64, message: &str) -> Value {
    let mut doc = envelope(METHOD_COMMAND_FAILURE, uri);
    doc.insert("id".to_string(), json!(id));
    doc.insert("code".to_string(), json!(code));
    doc.insert("message".to_string(), json!(message));
    Value::Object(doc)
}

pub fn event(uri: &str, name: &str, payload: Option<&Value>) -> Value {
    let mut doc = envelope(METHOD_EVENT, uri);
    doc.insert("name".to_string(), json!(name));
    doc.insert(
        "payload".to_string(),
        payload.cloned().unwrap_or_else(|| json!({})),
    );
    Value::Object(doc)
}

pub fn live_data_update(uri: &str, name: &str, operations: &[Value]) -> Value {
    let mut doc = envelope(METHOD_LIVE_DATA_UPDATE, uri);
    doc.insert("name".to_string(), json!(name));
    doc.insert("operations".to_string(), Value::Array(operations.to_vec()));
    Value::Object(doc)
}

/// Returns the `method` field when it is a string.
pub fn method_of(doc: &Value) -> Option<&str> {
    doc.get("method").and_then(Value::as_str)
}

/// Returns the numeric `id` field.
///
/// Integral floating point values are accepted; fractional values,
/// values outside the `i64` range and non-numbers are not.
pub fn command_id_of(doc: &Value) -> Option<i64> {
    let id = doc.get("id")?;
    if let Some(value) = id.as_i64() {
        return Some(value);
    }
    match id.as_f64() {
        // `i64::MAX as f64` rounds up to 2^63, which is already out of range.
        Some(value)
            if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 =>
        {
            Some(value as i64)
        }
        _ => None,
    }
}

fn envelope(method: &str, uri: &str) -> Map<String, Value> {
    let mut doc = Map::new();
    doc.insert("version".to_string(), json!(PROTOCOL_VERSION));
    doc.insert("method".to_string(), json!(method));
    doc.insert("uri".to_string(), json!(uri));
    doc
}
