//! HTTP header map with incremental, line-at-a-time parsing.
//!
//! Header names are case-insensitive per [RFC 9110 §5.1], so every name is
//! stored lower-cased. A repeated field line is merged into the existing
//! value joined by `", "` (RFC 9110 §5.3) rather than rejected.
//!
//! [RFC 9110 §5.1]: https://www.rfc-editor.org/rfc/rfc9110#section-5.1

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

const CRLF: &[u8] = b"\r\n";

/// Errors produced while parsing a single header field line.
///
/// All of them are fatal: waiting for more bytes cannot repair the line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeaderError {
    #[error("malformed header line: missing \": \" separator")]
    MissingSeparator,

    #[error("invalid whitespace around header name")]
    InvalidSpacing,

    #[error("empty header name")]
    EmptyName,

    #[error("invalid character in header name: {0:?}")]
    InvalidName(String),
}

/// Outcome of one [`Headers::parse`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderLine {
    /// No CRLF in the buffer yet; nothing was consumed.
    Partial,
    /// One field line of `consumed` bytes (CRLF included) was stored.
    Field { consumed: usize },
    /// The empty line ending the header block; always 2 bytes.
    End,
}

impl HeaderLine {
    /// Number of bytes this outcome consumed from the buffer.
    pub fn consumed(self) -> usize {
        match self {
            Self::Partial => 0,
            Self::Field { consumed } => consumed,
            Self::End => CRLF.len(),
        }
    }
}

/// A case-insensitive HTTP header map.
///
/// # Examples
///
/// ```
/// use httpfromtcp::http::{HeaderLine, Headers};
///
/// let mut headers = Headers::new();
/// let raw = b"Host: example.com\r\nHost: example.org\r\n\r\n";
///
/// let first = headers.parse(raw).unwrap();
/// let second = headers.parse(&raw[first.consumed()..]).unwrap();
/// let end = headers.parse(&raw[first.consumed() + second.consumed()..]).unwrap();
///
/// assert_eq!(end, HeaderLine::End);
/// assert_eq!(headers.get("HOST"), Some("example.com, example.org"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    inner: HashMap<String, String>,
}

impl Headers {
    /// Creates an empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses at most one field line from the front of `data`.
    ///
    /// The line must have the shape `name ": " value`. The name is validated
    /// as an HTTP token and lower-cased before it is stored.
    ///
    /// # Errors
    ///
    /// Returns a [`HeaderError`] if a complete line is present but malformed.
    pub fn parse(&mut self, data: &[u8]) -> Result<HeaderLine, HeaderError> {
        let Some(end) = find_crlf(data) else {
            return Ok(HeaderLine::Partial);
        };
        if end == 0 {
            return Ok(HeaderLine::End);
        }

        let line = String::from_utf8_lossy(&data[..end]);
        if line.trim() != line {
            return Err(HeaderError::InvalidSpacing);
        }

        let (name, value) = line
            .split_once(": ")
            .ok_or(HeaderError::MissingSeparator)?;
        if name.ends_with(char::is_whitespace) {
            return Err(HeaderError::InvalidSpacing);
        }
        validate_name(name)?;

        self.append(name, value);
        Ok(HeaderLine::Field {
            consumed: end + CRLF.len(),
        })
    }

    /// Returns the value for `name` (case-insensitive), or `None`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Inserts `value` under `name`, replacing any existing value.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.inner.insert(name.to_ascii_lowercase(), value.into());
    }

    /// Adds `value` under `name`, joining it onto an existing value with `", "`.
    pub fn append(&mut self, name: &str, value: &str) {
        self.inner
            .entry(name.to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_owned());
    }

    /// Removes `name`, returning its value if it was present.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.inner.remove(&name.to_ascii_lowercase())
    }

    /// Returns `true` if the map has a value for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(&name.to_ascii_lowercase())
    }

    /// Returns the number of distinct header names.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if there are no headers.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterates over `(name, value)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the entries sorted by name.
    pub fn sorted(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_unstable_by_key(|(k, _)| *k);
        entries
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.sorted() {
            writeln!(f, "- {name}: {value}")?;
        }
        Ok(())
    }
}

/// Position of the first CRLF in `data`, if any.
pub(crate) fn find_crlf(data: &[u8]) -> Option<usize> {
    data.windows(CRLF.len()).position(|w| w == CRLF)
}

/// `tchar` from RFC 9110 §5.6.2.
fn is_token_char(b: u8) -> bool {
    matches!(
        b,
        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_' | b'`'
            | b'|' | b'~' | b'0'..=b'9' | b'A'..=b'Z' | b'a'..=b'z'
    )
}

fn validate_name(name: &str) -> Result<(), HeaderError> {
    if name.is_empty() {
        return Err(HeaderError::EmptyName);
    }
    if !name.bytes().all(is_token_char) {
        return Err(HeaderError::InvalidName(name.to_owned()));
    }
    Ok(())
}
