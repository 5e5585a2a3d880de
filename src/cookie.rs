//! Request cookie extraction.

use indexmap::IndexMap;
use percent_encoding::percent_decode_str;

use crate::logging::EventLog;

/// Request cookies by name, in order of first appearance.
///
/// Values are URL-decoded (`%XX` escapes, `+` as a space). A repeated
/// name keeps its first position
/// and takes the later value.
pub type Cookies = IndexMap<String, String>;

/// Separator between cookies in a `Cookie` header.
pub(crate) const COOKIE_SEPARATOR: &str = "; ";

/// Builds cookies from individual `name=value` entries (2.0 `cookies` array).
pub(crate) fn from_entries<'e, I>(entries: I, log: &EventLog<'_>) -> Cookies
where
    I: IntoIterator<Item = &'e str>,
{
    let mut cookies = Cookies::new();
    for entry in entries {
        match entry.split_once('=') {
            Some((name, value)) => {
                cookies.insert(name.to_owned(), decode_value(value));
            }
            None => log.debug(format_args!("skipping cookie without '=': {entry:?}")),
        }
    }
    cookies
}

/// Builds cookies from `Cookie` header values.
pub(crate) fn from_header_values<'h, I>(values: I, log: &EventLog<'_>) -> Cookies
where
    I: IntoIterator<Item = &'h str>,
{
    from_entries(
        values
            .into_iter()
            .flat_map(|value| value.split(COOKIE_SEPARATOR))
            .filter(|entry| !entry.is_empty()),
        log,
    )
}

fn decode_value(value: &str) -> String {
    let value = value.replace('+', " ");
    percent_decode_str(&value).decode_utf8_lossy().into_owned()
}
