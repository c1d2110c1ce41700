//! HTTP/1.1 protocol types and incremental request parsing.
//!
//! The parsing pipeline, leaves first:
//!
//! - [`Headers`] — case-insensitive header map, parsed one field line at a time.
//! - [`RequestLine`] — method, target and version from the first line.
//! - [`Request`] — forward-only state machine that consumes buffered bytes.
//! - [`read_request`] — pulls bytes from an async stream into a growable
//!   buffer and feeds them to a [`Request`] until it is done.

use std::fmt;

pub mod headers;
pub mod reader;
pub mod request;
pub mod request_line;
pub mod response;

pub use headers::{HeaderError, HeaderLine, Headers};
pub use reader::{ReaderConfig, read_request};
pub use request::{ErrorKind, ParseState, Request, RequestError};
pub use request_line::{RequestLine, RequestLineError};
pub use response::Response;

/// The subset of HTTP status codes this crate writes.
///
/// # Examples
///
/// ```
/// use httpfromtcp::http::StatusCode;
///
/// assert_eq!(StatusCode::Ok.as_u16(), 200);
/// assert_eq!(StatusCode::BadRequest.to_string(), "400 Bad Request");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum StatusCode {
    Ok = 200,
    BadRequest = 400,
    InternalServerError = 500,
}

impl StatusCode {
    /// Returns the numeric status code as a `u16`.
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns the canonical reason phrase for this status code.
    pub fn canonical_reason(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::BadRequest => "Bad Request",
            Self::InternalServerError => "Internal Server Error",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.canonical_reason())
    }
}
