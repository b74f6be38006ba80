//! URL decoding helpers
//!
//! Path segments are percent-decoded only (`+` stays `+`); query strings are
//! form-decoded, so `+` becomes a space the way browsers submit forms.

use percent_encoding::percent_decode_str;
use std::borrow::Cow;

/// Percent-decode a single path segment.
///
/// Returns `None` when the decoded bytes are not valid UTF-8.
pub fn decode_path_segment(segment: &str) -> Option<String> {
    percent_decode_str(segment)
        .decode_utf8()
        .ok()
        .map(Cow::into_owned)
}

/// Look up the first value of `key` in a raw query string
pub fn query_param(query: Option<&str>, key: &str) -> Option<String> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query?).ok()?;
    pairs.into_iter().find(|(k, _)| k == key).map(|(_, v)| v)
}
