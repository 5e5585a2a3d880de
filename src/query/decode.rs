use url::form_urlencoded;

use super::{QueryMap, QueryValue};

/// One bracketed step of a parameter name.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// `[]`: append to the list at this level
    Append,
    /// `[name]`: set the named field at this level
    Field(String),
    /// Unterminated remainder of a malformed name, used as one field
    Literal(String),
}

/// Splits a raw query string into decoded `(key, value)` pairs.
///
/// A single leading `?`, `#` or `&` is ignored, empty segments are skipped,
/// a segment without `=` yields an empty value and segments with an empty
/// key are dropped. Keys and values are form-decoded (`%XX`, `+` as space).
/// Repeated keys are all kept, in order.
///
/// # Examples
///
/// ```
/// use lambda_http_event::query::pairs;
///
/// let p = pairs("?a=1&&a=hello+world&flag");
/// assert_eq!(
///     p,
///     vec![
///         ("a".to_string(), "1".to_string()),
///         ("a".to_string(), "hello world".to_string()),
///         ("flag".to_string(), String::new()),
///     ]
/// );
/// ```
pub fn pairs(raw: &str) -> Vec<(String, String)> {
    let raw = raw
        .strip_prefix(|c: char| matches!(c, '?' | '#' | '&'))
        .unwrap_or(raw);

    form_urlencoded::parse(raw.as_bytes())
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}

/// Decodes a raw query string into nested parameters.
///
/// Names without brackets are plain values (the last duplicate wins).
/// Bracketed names build nested values: `a[]` appends to a list and
/// `a[b]` sets a field. A name whose brackets are not closed keeps the
/// unterminated remainder as one literal field name (`a[b[c` sets field
/// `b_c`) instead of failing, so that decoding the encoded result yields
/// the same parameters.
///
/// Sibling keys keep the order in which they first appear.
///
/// # Examples
///
/// ```
/// use lambda_http_event::query::{decode, QueryValue};
///
/// let params = decode("x=1&y[a]=2&z[]=3&z[]=4");
///
/// assert_eq!(params["x"].as_str(), Some("1"));
/// assert_eq!(params["y"].get("a"), Some(&QueryValue::from("2")));
/// assert_eq!(
///     params["z"],
///     QueryValue::List(vec!["3".into(), "4".into()])
/// );
/// ```
pub fn decode(raw: &str) -> QueryMap {
    let mut params = QueryMap::new();
    for (key, value) in pairs(raw) {
        insert(&mut params, &key, value);
    }
    params
}

fn insert(params: &mut QueryMap, key: &str, value: String) {
    let (base, rest) = match key.split_once('[') {
        Some((base, rest)) if !base.is_empty() => (base, rest),
        _ => {
            params.insert(key.to_owned(), QueryValue::Scalar(value));
            return;
        }
    };

    let tokens: Vec<&str> = rest.split('[').collect();
    let path = segments(&tokens);

    let slot = params
        .entry(base.to_owned())
        .or_insert_with(QueryValue::empty);
    assign(slot, &path, value);
}

/// Turns the `[`-separated tokens that follow the base name into segments.
///
/// Every token is expected to end with `]`. The first one that does not
/// is re-joined with everything after it into a single literal segment,
/// with each `[` turned into `_` so the field encodes back to the same
/// name. An empty remainder (`a[`) adds no segment.
fn segments(tokens: &[&str]) -> Vec<Segment> {
    let Some((head, tail)) = tokens.split_first() else {
        return Vec::new();
    };

    match head.strip_suffix(']') {
        Some("") => {
            let mut path = vec![Segment::Append];
            path.extend(segments(tail));
            path
        }
        Some(name) => {
            let mut path = vec![Segment::Field(name.to_owned())];
            path.extend(segments(tail));
            path
        }
        None => {
            let literal = tokens.join("_");
            if literal.is_empty() {
                Vec::new()
            } else {
                vec![Segment::Literal(literal)]
            }
        }
    }
}

/// Stores `value` at `path` below `target`, creating levels as needed.
fn assign(target: &mut QueryValue, path: &[Segment], value: String) {
    let Some((segment, rest)) = path.split_first() else {
        *target = QueryValue::Scalar(value);
        return;
    };

    match segment {
        Segment::Append => {
            let slot = build(rest, value);
            match target {
                QueryValue::List(items) => items.push(slot),
                QueryValue::Object(map) => {
                    let key = next_index(map);
                    map.insert(key, slot);
                }
                scalar => *scalar = QueryValue::List(vec![slot]),
            }
        }
        Segment::Field(name) | Segment::Literal(name) => {
            if let QueryValue::Object(map) = target {
                let slot = map.entry(name.clone()).or_insert_with(QueryValue::empty);
                assign(slot, rest, value);
                return;
            }

            let mut map = match std::mem::replace(target, QueryValue::empty()) {
                QueryValue::List(items) => items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| (i.to_string(), item))
                    .collect(),
                _ => QueryMap::new(),
            };
            map.insert(name.clone(), build(rest, value));
            *target = QueryValue::Object(map);
        }
    }
}

fn build(path: &[Segment], value: String) -> QueryValue {
    let mut slot = QueryValue::empty();
    assign(&mut slot, path, value);
    slot
}

/// Next free integer key of an object, one past the largest numeric key.
fn next_index(map: &QueryMap) -> String {
    map.keys()
        .filter_map(|k| k.parse::<usize>().ok())
        .max()
        .map_or(0, |i| i + 1)
        .to_string()
}
