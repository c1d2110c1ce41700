//! Minimal HTTP/1.1 response writer for the connection handler.
//!
//! Every response closes the connection; there is no keep-alive.

use bytes::{BufMut, Bytes, BytesMut};

use super::{Headers, StatusCode};

/// An HTTP/1.1 response, ready to be written to a socket.
///
/// # Examples
///
/// ```
/// use httpfromtcp::http::{Response, StatusCode};
///
/// let bytes = Response::new(StatusCode::Ok).body("hi").into_bytes();
/// let text = std::str::from_utf8(&bytes).unwrap();
/// assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
/// assert!(text.contains("content-length: 2\r\n"));
/// assert!(text.ends_with("\r\n\r\nhi"));
/// ```
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: Headers,
    body: Bytes,
}

impl Response {
    /// Creates a response with the given status and an empty body.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Bytes::new(),
        }
    }

    /// Sets a header, replacing any previous value for the same name.
    #[must_use]
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Serializes the response. `content-length` and `connection: close` are
    /// always written and override any caller-supplied values.
    pub fn into_bytes(mut self) -> BytesMut {
        self.headers
            .set("content-length", self.body.len().to_string());
        self.headers.set("connection", "close");

        let mut buf = BytesMut::with_capacity(64 + self.headers.len() * 32 + self.body.len());
        buf.put(format!("HTTP/1.1 {}\r\n", self.status).as_bytes());
        for (name, value) in self.headers.sorted() {
            buf.put(format!("{name}: {value}\r\n").as_bytes());
        }
        buf.put(&b"\r\n"[..]);
        buf.put(self.body);
        buf
    }
}

impl Default for Response {
    /// `200 OK` with a plain-text greeting.
    fn default() -> Self {
        Self::new(StatusCode::Ok)
            .header("content-type", "text/plain")
            .body("Hello World!\n")
    }
}
