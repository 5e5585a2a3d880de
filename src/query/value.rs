use indexmap::IndexMap;
use serde_json::Value;

/// Decoded query parameters, in order of first appearance.
pub type QueryMap = IndexMap<String, QueryValue>;

/// A decoded query parameter value.
///
/// Bracket notation in parameter names produces nested values:
/// `a=1` is a [`Scalar`](QueryValue::Scalar), `a[]=1` a
/// [`List`](QueryValue::List) and `a[b]=1` an [`Object`](QueryValue::Object).
///
/// # Examples
///
/// ```
/// use lambda_http_event::query::{decode, QueryValue};
///
/// let params = decode("tags[]=rust&tags[]=lambda&page=2");
///
/// assert_eq!(params["page"], QueryValue::from("2"));
/// assert_eq!(params["tags"].as_list().map(|l| l.len()), Some(2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    /// A plain string value
    Scalar(String),
    /// Values appended with `[]`
    List(Vec<QueryValue>),
    /// Values keyed with `[name]`
    Object(QueryMap),
}

impl QueryValue {
    /// Slot placeholder used while a nested key is being assigned.
    pub(crate) fn empty() -> Self {
        QueryValue::Scalar(String::new())
    }

    /// Returns the string if this is a scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            QueryValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the items if this is a list.
    pub fn as_list(&self) -> Option<&[QueryValue]> {
        match self {
            QueryValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the fields if this is an object.
    pub fn as_object(&self) -> Option<&QueryMap> {
        match self {
            QueryValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up a named field of an object value.
    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.as_object().and_then(|map| map.get(key))
    }
}

impl From<&str> for QueryValue {
    fn from(s: &str) -> Self {
        QueryValue::Scalar(s.to_owned())
    }
}

impl From<String> for QueryValue {
    fn from(s: String) -> Self {
        QueryValue::Scalar(s)
    }
}

impl From<QueryValue> for Value {
    fn from(value: QueryValue) -> Self {
        match value {
            QueryValue::Scalar(s) => Value::String(s),
            QueryValue::List(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            QueryValue::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accessors_match_variant() {
        let scalar = QueryValue::from("x");
        assert_eq!(scalar.as_str(), Some("x"));
        assert!(scalar.as_list().is_none());
        assert!(scalar.as_object().is_none());

        let list = QueryValue::List(vec!["a".into(), "b".into()]);
        assert_eq!(list.as_list().map(<[_]>::len), Some(2));
        assert!(list.as_str().is_none());
    }

    #[test]
    fn get_reads_object_fields_only() {
        let mut map = QueryMap::new();
        map.insert("a".to_string(), "1".into());
        let object = QueryValue::Object(map);

        assert_eq!(object.get("a"), Some(&QueryValue::from("1")));
        assert_eq!(object.get("b"), None);
        assert_eq!(QueryValue::from("a").get("a"), None);
    }

    #[test]
    fn converts_to_json_preserving_order() {
        let mut inner = QueryMap::new();
        inner.insert("z".to_string(), "1".into());
        inner.insert("a".to_string(), QueryValue::List(vec!["2".into()]));

        let value = Value::from(QueryValue::Object(inner));

        assert_eq!(value, json!({"z": "1", "a": ["2"]}));
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a"]);
    }
}
