//! Parse the probe response headers: `Content-Range` and the cache validator.

use std::fmt;

/// Parsed `Content-Range: bytes <start>-<end>/<total>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRange {
    pub start: u64,
    /// Inclusive.
    pub end: u64,
    pub total: u64,
}

/// Parse a `Content-Range` value. Returns None when the unit is not `bytes`,
/// the range part is malformed, or the total is unknown (`*`).
pub fn parse_content_range(value: &str) -> Option<ContentRange> {
    let value = value.trim();
    let (unit, rest) = value.split_once(char::is_whitespace)?;
    if !unit.eq_ignore_ascii_case("bytes") {
        return None;
    }
    let (range, total) = rest.trim().split_once('/')?;
    let total = total.trim().parse::<u64>().ok()?;
    let (start, end) = range.trim().split_once('-')?;
    let start = start.trim().parse::<u64>().ok()?;
    let end = end.trim().parse::<u64>().ok()?;
    if start > end {
        return None;
    }
    Some(ContentRange { start, end, total })
}

/// Value sent back as `If-Range` so the server only honours a range against
/// the same representation the probe saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validator {
    /// Strong entity tag, quotes included (e.g. `"abc"`).
    EntityTag(String),
    /// `Last-Modified` HTTP date.
    LastModified(String),
}

impl Validator {
    pub fn as_str(&self) -> &str {
        match self {
            Validator::EntityTag(v) | Validator::LastModified(v) => v,
        }
    }
}

impl fmt::Display for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prefer a strong ETag (starts with `"`; weak `W/"..."` tags cannot be used
/// with `If-Range`), else a non-empty `Last-Modified`.
pub fn validator_from_headers(etag: Option<&str>, last_modified: Option<&str>) -> Option<Validator> {
    if let Some(tag) = etag.map(str::trim) {
        if tag.starts_with('"') {
            return Some(Validator::EntityTag(tag.to_string()));
        }
    }
    last_modified
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| Validator::LastModified(v.to_string()))
}
