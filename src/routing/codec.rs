//! Path-safe encodings for route variables.
//!
//! # Responsibilities
//! - Embed an arbitrary clone URL as exactly one path segment
//! - Canonicalize tree paths (`.` for the root, clean relative paths otherwise)
//! - Percent-escape ordinary placeholder values
//!
//! # Design Decisions
//! - Clone URLs are query-escaped, then every `%2F` becomes `$` to keep
//!   them short and readable. Query escaping always turns a literal `$`
//!   into `%24`, so the substitution is unambiguous.
//! - Tree paths that climb above the root are rejected, never clamped.
//! - Every function is pure; nothing here allocates beyond its output.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS, NON_ALPHANUMERIC};

use super::error::RouteError;

/// Characters escaped in a query-string value: everything except `A-Z a-z 0-9 - _ . ~`.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Characters escaped inside a multi-segment path suffix.
const PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Characters escaped inside a single path segment.
const SEGMENT: &AsciiSet = &PATH.add(b'/');

/// The escaped form of `/` in query escaping, and its compact stand-in.
const ESCAPED_SLASH: &str = "%2F";
const SLASH_SUBSTITUTE: &str = "$";

/// The canonical tree path naming the root of a tree.
pub const TREE_ROOT: &str = ".";

/// Encodes a clone URL as a single path segment.
///
/// ```
/// use vcsstore::routing::codec::encode_clone_url;
///
/// assert_eq!(
///     encode_clone_url("https://example.com/foo/bar.git"),
///     "https%3A$$example.com$foo$bar.git"
/// );
/// ```
pub fn encode_clone_url(clone_url: &str) -> String {
    query_escape(clone_url).replace(ESCAPED_SLASH, SLASH_SUBSTITUTE)
}

/// Decodes a segment produced by [`encode_clone_url`].
pub fn decode_clone_url(escaped: &str) -> Result<String, RouteError> {
    query_unescape(&escaped.replace(SLASH_SUBSTITUTE, ESCAPED_SLASH))
}

/// Decodes the raw suffix captured after `/tree` into a canonical tree path.
///
/// A single leading `/` is stripped before cleaning. Empty results and `.`
/// both canonicalize to [`TREE_ROOT`].
pub fn decode_tree_path(raw_suffix: &str) -> Result<String, RouteError> {
    let relative = raw_suffix.strip_prefix('/').unwrap_or(raw_suffix);
    clean_relative(relative)
}

/// Produces the `/tree` suffix for a tree path: empty for the root,
/// otherwise `/` followed by the cleaned path.
pub fn encode_tree_path(path: &str) -> Result<String, RouteError> {
    if path == TREE_ROOT {
        return Ok(String::new());
    }
    let cleaned = clean_relative(path)?;
    if cleaned == TREE_ROOT {
        Ok(String::new())
    } else {
        Ok(format!("/{cleaned}"))
    }
}

/// Lexically cleans a slash-separated path relative to a root.
///
/// Empty and `.` components are dropped and `..` removes the preceding
/// component. A `..` with nothing left to remove is an error. Leading
/// slashes are ignored, so the result is always relative.
pub fn clean_relative(path: &str) -> Result<String, RouteError> {
    let mut parts: Vec<&str> = Vec::new();
    for component in path.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                if parts.pop().is_none() {
                    return Err(RouteError::InvalidPath(format!(
                        "{path:?} escapes the tree root"
                    )));
                }
            }
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        Ok(TREE_ROOT.to_string())
    } else {
        Ok(parts.join("/"))
    }
}

/// Percent-escapes a value for use as one path segment (escapes `/`).
pub fn escape_segment(value: &str) -> String {
    utf8_percent_encode(value, SEGMENT).to_string()
}

/// Percent-escapes a multi-segment path, leaving `/` intact.
pub fn escape_path(value: &str) -> String {
    utf8_percent_encode(value, PATH).to_string()
}

/// Whether URL normalization would remove or collapse `segment` in transit:
/// `.` and `..`, including their percent-encoded spellings.
pub fn is_dot_segment(segment: &str) -> bool {
    let dots = segment.to_ascii_lowercase().replace("%2e", ".");
    dots == "." || dots == ".."
}

/// Reverses [`escape_segment`] and [`escape_path`].
pub fn unescape(value: &str) -> Result<String, RouteError> {
    check_percent_sequences(value)?;
    percent_decode_str(value)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| RouteError::MalformedInput(format!("{value:?} does not decode to UTF-8")))
}

/// Query-string escaping: unreserved characters pass through, spaces become
/// `+`, everything else becomes `%XX` with upper-case hex.
fn query_escape(value: &str) -> String {
    // A literal "%20" in the input is escaped to "%2520", so every "%20"
    // here came from a space.
    utf8_percent_encode(value, QUERY_VALUE)
        .to_string()
        .replace("%20", "+")
}

fn query_unescape(value: &str) -> Result<String, RouteError> {
    check_percent_sequences(value)?;
    let spaced = value.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| RouteError::MalformedInput(format!("{value:?} does not decode to UTF-8")))
}

/// Rejects `%` not followed by two hex digits.
fn check_percent_sequences(value: &str) -> Result<(), RouteError> {
    let bytes = value.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                let end = (i + 3).min(bytes.len());
                return Err(RouteError::MalformedInput(format!(
                    "invalid escape {:?} in {value:?}",
                    String::from_utf8_lossy(&bytes[i..end])
                )));
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    Ok(())
}
