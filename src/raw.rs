use serde_json::{Map, Value};

/// The untyped Lambda event as delivered by the invoking runtime.
///
/// Lookups use JSON pointers (`/requestContext/http/method`) and treat an
/// explicit `null` the same as a missing field, since API Gateway sends
/// `null` for absent optional sections.
///
/// # Examples
///
/// ```
/// use lambda_http_event::RawEvent;
/// use serde_json::json;
///
/// let raw = RawEvent::new(json!({
///     "httpMethod": "GET",
///     "headers": null,
///     "requestContext": { "identity": { "sourceIp": "10.0.0.1" } }
/// }));
///
/// assert_eq!(raw.str("/requestContext/identity/sourceIp"), Some("10.0.0.1"));
/// assert!(raw.get("/headers").is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
    value: Value,
}

impl RawEvent {
    /// Wraps an event document.
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    /// Returns the underlying document.
    pub fn as_value(&self) -> &Value {
        &self.value
    }

    /// Consumes the wrapper and returns the document.
    pub fn into_inner(self) -> Value {
        self.value
    }

    /// Looks up a non-null value by JSON pointer.
    pub fn get(&self, pointer: &str) -> Option<&Value> {
        self.value.pointer(pointer).filter(|v| !v.is_null())
    }

    /// Returns `true` if the pointer resolves to a non-null value.
    pub fn contains(&self, pointer: &str) -> bool {
        self.get(pointer).is_some()
    }

    /// Looks up a string value by JSON pointer.
    pub fn str(&self, pointer: &str) -> Option<&str> {
        self.get(pointer).and_then(Value::as_str)
    }

    /// Looks up an object by JSON pointer.
    pub fn object(&self, pointer: &str) -> Option<&Map<String, Value>> {
        self.get(pointer).and_then(Value::as_object)
    }

    /// Looks up a boolean by JSON pointer.
    pub fn bool(&self, pointer: &str) -> Option<bool> {
        self.get(pointer).and_then(Value::as_bool)
    }
}

impl From<Value> for RawEvent {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

/// Renders a scalar JSON value as text.
///
/// Strings are returned as-is, numbers and booleans in their JSON form.
/// `null`, arrays and objects have no scalar text.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Coerces a value into a list of texts: arrays keep their scalar items,
/// a single scalar becomes a one-element list.
pub(crate) fn text_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
        other => scalar_text(other).into_iter().collect(),
    }
}
