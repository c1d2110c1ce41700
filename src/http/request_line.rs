//! Request-line parsing: `METHOD SP TARGET SP HTTP/VERSION CRLF`.

use std::fmt;

use thiserror::Error;

use super::headers::find_crlf;

const VERSION_PREFIX: &str = "HTTP/";

/// Errors produced while parsing the request line. Always fatal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestLineError {
    #[error("malformed request line: expected 3 fields, found {0}")]
    FieldCount(usize),

    #[error("malformed request line: empty field")]
    EmptyField,

    #[error("invalid HTTP version: {0:?}")]
    InvalidVersion(String),
}

/// The first line of an HTTP request.
///
/// # Examples
///
/// ```
/// use httpfromtcp::http::RequestLine;
///
/// let (line, consumed) = RequestLine::parse(b"GET /path HTTP/1.1\r\n").unwrap().unwrap();
/// assert_eq!(line.method(), "GET");
/// assert_eq!(line.target(), "/path");
/// assert_eq!(line.version(), "1.1");
/// assert_eq!(consumed, 20);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    method: String,
    target: String,
    version: String,
}

impl RequestLine {
    /// Parses the request line at the front of `data`.
    ///
    /// Returns `Ok(None)` when no CRLF has arrived yet. Otherwise returns the
    /// line together with the number of bytes consumed, CRLF included.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestLineError`] when the line does not split into exactly
    /// three non-empty fields or the last one lacks the `HTTP/` prefix.
    pub fn parse(data: &[u8]) -> Result<Option<(Self, usize)>, RequestLineError> {
        let Some(end) = find_crlf(data) else {
            return Ok(None);
        };

        let line = String::from_utf8_lossy(&data[..end]);
        let parts: Vec<&str> = line.split(' ').collect();
        let [method, target, version] = parts[..] else {
            return Err(RequestLineError::FieldCount(parts.len()));
        };
        if method.is_empty() || target.is_empty() {
            return Err(RequestLineError::EmptyField);
        }

        let version = version
            .strip_prefix(VERSION_PREFIX)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| RequestLineError::InvalidVersion(version.to_owned()))?;

        Ok(Some((
            Self {
                method: method.to_owned(),
                target: target.to_owned(),
                version: version.to_owned(),
            },
            end + 2,
        )))
    }

    /// The request method, e.g. `GET`.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The request target, e.g. `/coffee`.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The protocol version with the `HTTP/` prefix stripped, e.g. `1.1`.
    pub fn version(&self) -> &str {
        &self.version
    }
}

impl fmt::Display for RequestLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Request line:")?;
        writeln!(f, "- Method: {}", self.method)?;
        writeln!(f, "- Target: {}", self.target)?;
        writeln!(f, "- Version: {}", self.version)
    }
}
