use url::form_urlencoded;

use super::{QueryMap, QueryValue};

/// Encodes parameters into a canonical query string.
///
/// Keys and values are form-encoded (space as `+`). Nested values are
/// flattened with bracket notation: list items as `key[0]`, `key[1]`, ...
/// and object fields as `key[name]`. Empty lists and objects produce no
/// output.
///
/// # Examples
///
/// ```
/// use lambda_http_event::query::{decode, encode};
///
/// assert_eq!(encode(&decode("a=hello world&b[]=1")), "a=hello+world&b%5B0%5D=1");
/// ```
pub fn encode(params: &QueryMap) -> String {
    let mut flat = Vec::new();
    for (key, value) in params {
        flatten(key.clone(), value, &mut flat);
    }
    encode_pairs(flat)
}

/// Form-encodes an ordered list of `(key, value)` pairs, keeping repeats.
///
/// # Examples
///
/// ```
/// use lambda_http_event::query::encode_pairs;
///
/// assert_eq!(encode_pairs([("p", "1"), ("p", "a&b")]), "p=1&p=a%26b");
/// ```
pub fn encode_pairs<I, K, V>(pairs: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// Appends the bracket-notation pairs of one parameter to `out`.
pub(crate) fn flatten(prefix: String, value: &QueryValue, out: &mut Vec<(String, String)>) {
    match value {
        QueryValue::Scalar(s) => out.push((prefix, s.clone())),
        QueryValue::List(items) => {
            for (i, item) in items.iter().enumerate() {
                flatten(format!("{prefix}[{i}]"), item, out);
            }
        }
        QueryValue::Object(map) => {
            for (key, item) in map {
                flatten(format!("{prefix}[{key}]"), item, out);
            }
        }
    }
}
