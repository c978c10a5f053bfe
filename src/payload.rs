use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::trace;

/// Caller value attached to a log call.
///
/// Plain values are forwarded as-is. Errors are flattened into an
/// [`ErrorInfo`] because a Rust error has no meaningful JSON form of its own.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Value(Value),
    Error(ErrorInfo),
}

/// Structured description of an error, as sent to the collector.
///
/// `code` and `details` are only serialized when present and truthy
/// (not `null`, `false`, `0` or an empty string).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub message: String,
    pub stack: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorInfo {
    /// Build an error record from its parts. The stack is used verbatim.
    pub fn new(name: impl Into<String>, message: impl Into<String>, stack: impl Into<String>) -> Self {
        ErrorInfo {
            message: message.into(),
            stack: stack.into(),
            name: name.into(),
            code: None,
            details: None,
        }
    }

    /// Describe `err` using its `Display` text as the message and the last
    /// segment of its type name as the name. The stack is captured here and
    /// starts with a `"{name}: {message}"` header line.
    ///
    /// The `source()` chain is not included.
    pub fn from_error<E>(err: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        let name = short_type_name(std::any::type_name::<E>()).to_string();
        let message = err.to_string();
        let frames = trace::capture();
        let stack = if frames.is_empty() {
            format!("{name}: {message}")
        } else {
            format!("{name}: {message}\n{frames}")
        };
        ErrorInfo::new(name, message, stack)
    }

    /// Attach an error code. Falsy values are dropped.
    pub fn with_code(mut self, code: impl Into<Value>) -> Self {
        self.code = truthy(code.into());
        self
    }

    /// Attach extra details. Falsy values are dropped.
    pub fn with_details(mut self, details: impl Into<Value>) -> Self {
        self.details = truthy(details.into());
        self
    }
}

fn truthy(value: Value) -> Option<Value> {
    let keep = match &value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    };
    keep.then_some(value)
}

/// `my_crate::db::QueryError` -> `QueryError`, keeping generic arguments intact.
fn short_type_name(full: &str) -> &str {
    let base_end = full.find('<').unwrap_or(full.len());
    let start = full[..base_end].rfind("::").map_or(0, |i| i + 2);
    &full[start..]
}

/// Normalize a payload into the JSON value placed in a record.
///
/// Plain values come back unchanged. Errors become an object with
/// `message`, `stack` and `name`, plus `code` and `details` when set.
pub fn format_payload(payload: Payload) -> Value {
    match payload {
        Payload::Value(value) => value,
        Payload::Error(info) => {
            let mut obj = serde_json::Map::new();
            obj.insert("message".to_string(), Value::String(info.message));
            obj.insert("stack".to_string(), Value::String(info.stack));
            obj.insert("name".to_string(), Value::String(info.name));
            if let Some(code) = info.code.and_then(truthy) {
                obj.insert("code".to_string(), code);
            }
            if let Some(details) = info.details.and_then(truthy) {
                obj.insert("details".to_string(), details);
            }
            Value::Object(obj)
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Value(value)
    }
}

impl From<ErrorInfo> for Payload {
    fn from(info: ErrorInfo) -> Self {
        Payload::Error(info)
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::Value(Value::String(s.to_string()))
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::Value(Value::String(s))
    }
}

impl From<bool> for Payload {
    fn from(b: bool) -> Self {
        Payload::Value(Value::Bool(b))
    }
}

impl<T: Into<Payload>> From<Option<T>> for Payload {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Payload::Value(Value::Null), Into::into)
    }
}

macro_rules! payload_from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Payload {
                fn from(n: $t) -> Self {
                    Payload::Value(Value::from(n))
                }
            }
        )*
    };
}

payload_from_number!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);
