//! Cache validation helpers
//!
//! Content `ETag`s for static assets, `If-None-Match` evaluation and the two
//! `Cache-Control` policies the server uses.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Strong `ETag` for a file body: `"<len>-<hash>"`
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("\"{:x}-{:x}\"", content.len(), hasher.finish())
}

/// `true` when `If-None-Match` names `etag` (or is `*`).
///
/// Uses weak comparison, so `W/"..."` entries match their strong form.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    let Some(header) = if_none_match else {
        return false;
    };
    let wanted = opaque_tag(etag);

    header.split(',').map(str::trim).any(|candidate| {
        candidate == "*" || opaque_tag(candidate) == wanted
    })
}

fn opaque_tag(tag: &str) -> &str {
    tag.strip_prefix("W/").unwrap_or(tag)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Shared caches may keep the response for `max-age` seconds
    Public(u32),
    /// Roster data changes on every signup
    NoStore,
}

impl CachePolicy {
    /// Front-end assets
    pub const STATIC: Self = Self::Public(3600);

    pub fn to_header_value(self) -> String {
        match self {
            Self::Public(max_age) => format!("public, max-age={max_age}"),
            Self::NoStore => "no-store".to_string(),
        }
    }
}
