use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::format::PayloadFormat;
use crate::query::{self, QueryValue};
use crate::raw::{scalar_text, text_list, RawEvent};

/// Where the query string of an event comes from.
///
/// API Gateway and ALB deliver query parameters in four different shapes.
/// Each variant is turned into the same canonical form by decoding it with
/// the query codec and encoding it again.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum QuerySource<'a> {
    /// 2.0 `rawQueryString`, URL-encoded as received
    Raw(&'a str),
    /// ALB parameters; values still URL-encoded
    LoadBalancer(&'a Map<String, Value>),
    /// 1.0 `multiValueQueryStringParameters`; values already decoded
    MultiValue(&'a Map<String, Value>),
    /// 1.0 `queryStringParameters`; values already decoded
    Single(&'a Map<String, Value>),
    /// No query parameters at all
    Empty,
}

impl<'a> QuerySource<'a> {
    /// Selects the query source of an event.
    pub(crate) fn select(event: &'a RawEvent, format: PayloadFormat) -> Self {
        if format.is_v2() {
            return QuerySource::Raw(event.str("/rawQueryString").unwrap_or(""));
        }

        let multi = event.object("/multiValueQueryStringParameters");
        let single = event.object("/queryStringParameters");

        if event.contains("/requestContext/elb") {
            return match multi.or(single) {
                Some(params) => QuerySource::LoadBalancer(params),
                None => QuerySource::Empty,
            };
        }

        match (multi, single) {
            (Some(params), _) if !params.is_empty() => QuerySource::MultiValue(params),
            (_, Some(params)) if !params.is_empty() => QuerySource::Single(params),
            _ => QuerySource::Empty,
        }
    }

    /// Short name used in diagnostics.
    pub(crate) fn name(&self) -> &'static str {
        match self {
            QuerySource::Raw(_) => "rawQueryString",
            QuerySource::LoadBalancer(_) => "load balancer parameters",
            QuerySource::MultiValue(_) => "multi-value parameters",
            QuerySource::Single(_) => "single-value parameters",
            QuerySource::Empty => "none",
        }
    }

    /// Builds the canonical query string.
    pub(crate) fn canonicalize(&self) -> String {
        match self {
            QuerySource::Raw(raw) => query::encode(&query::decode(raw)),
            QuerySource::LoadBalancer(params) => canonical_multi(params, |value| value.to_owned()),
            QuerySource::MultiValue(params) => canonical_multi(params, |value| {
                form_urlencoded::byte_serialize(value.as_bytes()).collect()
            }),
            QuerySource::Single(params) => query::encode_pairs(
                params
                    .iter()
                    .filter_map(|(key, value)| scalar_text(value).map(|text| (key, text))),
            ),
            QuerySource::Empty => String::new(),
        }
    }
}

/// Canonicalizes a multi-value map.
///
/// The map is rebuilt into one raw query string, in source order, with
/// `wire` rendering keys and values the way they appear on the wire. That
/// string is decoded once and re-encoded. A plain key that arrived with
/// several values keeps all of them as repeated pairs, at the position of
/// its first appearance.
fn canonical_multi<F>(params: &Map<String, Value>, wire: F) -> String
where
    F: Fn(&str) -> String,
{
    let raw = params
        .iter()
        .flat_map(|(key, values)| {
            let key = wire(key.as_str());
            text_list(values)
                .into_iter()
                .map(|value| format!("{key}={}", wire(value.as_str())))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>()
        .join("&");

    let pairs = query::pairs(&raw);
    let decoded = query::decode(&raw);

    let mut flat = Vec::new();
    for (key, value) in &decoded {
        match value {
            QueryValue::Scalar(last) => {
                let plain: Vec<&String> = pairs
                    .iter()
                    .filter(|(name, _)| name == key)
                    .map(|(_, value)| value)
                    .collect();
                if plain.len() > 1 && plain.last() == Some(&last) {
                    flat.extend(plain.into_iter().map(|value| (key.clone(), value.clone())));
                } else {
                    flat.push((key.clone(), last.clone()));
                }
            }
            nested => query::flatten(key.clone(), nested, &mut flat),
        }
    }
    query::encode_pairs(flat)
}
