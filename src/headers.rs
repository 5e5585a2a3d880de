use std::ops::Index;

use indexmap::IndexMap;

/// Request headers with lower-cased names and ordered values.
///
/// Each name maps to every value received for it, so repeated headers
/// survive normalization. Lookups are case-insensitive.
///
/// # Examples
///
/// ```
/// use lambda_http_event::HttpRequestEvent;
/// use serde_json::json;
///
/// let request = HttpRequestEvent::new(json!({
///     "httpMethod": "GET",
///     "multiValueHeaders": { "Accept": ["text/html", "application/json"] }
/// }))
/// .unwrap();
///
/// let headers = request.headers();
/// assert_eq!(headers.get("ACCEPT").map(<[_]>::len), Some(2));
/// assert_eq!(headers.first("accept"), Some("text/html"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: IndexMap<String, Vec<String>>,
}

impl Headers {
    /// Returns every value of a header.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries
            .get(name.to_ascii_lowercase().as_str())
            .map(Vec::as_slice)
    }

    /// Returns the first value of a header.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns `true` if the header is present.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name.to_ascii_lowercase().as_str())
    }

    /// Iterates over headers in the order they were first received.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Returns the number of distinct header names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no headers.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds values under a header name, merging with earlier values for
    /// the same name in any case.
    pub(crate) fn append<I>(&mut self, name: &str, values: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.entries
            .entry(name.to_ascii_lowercase())
            .or_default()
            .extend(values);
    }

    /// Replaces all values of a header with one value.
    pub(crate) fn set(&mut self, name: &str, value: String) {
        self.entries.insert(name.to_ascii_lowercase(), vec![value]);
    }
}

impl Index<&str> for Headers {
    type Output = [String];

    /// Returns every value of a header.
    ///
    /// # Panics
    ///
    /// Panics if the header is not present.
    fn index(&self, name: &str) -> &[String] {
        match self.get(name) {
            Some(values) => values,
            None => panic!("header `{name}` is not present"),
        }
    }
}
