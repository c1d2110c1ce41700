//! Incremental HTTP/1.1 request state machine.
//!
//! A [`Request`] is fed whatever bytes are currently buffered and consumes as
//! much of them as it can. Parsing moves strictly forward through
//! [`ParseState`]; a state that needs more bytes than are present reports zero
//! consumed and waits for the next read.

use std::fmt;

use bytes::{Bytes, BytesMut};
use thiserror::Error;
use tracing::trace;

use super::headers::{HeaderError, HeaderLine, Headers};
use super::request_line::{RequestLine, RequestLineError};

/// Errors that terminate a parsing session.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error(transparent)]
    RequestLine(#[from] RequestLineError),

    #[error(transparent)]
    Header(#[from] HeaderError),

    #[error("malformed content-length: {0:?}")]
    InvalidContentLength(String),

    #[error("declared length exceeded: content-length is {declared}, received {received} bytes")]
    ContentLengthExceeded { declared: usize, received: usize },

    #[error("incomplete request")]
    Incomplete,

    #[error("request exceeds maximum buffered size of {max_bytes} bytes")]
    TooLarge { max_bytes: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`RequestError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The bytes violate the request grammar.
    Malformed,
    /// More bytes arrived than the message may contain.
    LengthViolation,
    /// The stream ended before the request was complete.
    Incomplete,
    /// The underlying stream failed.
    Transport,
}

impl RequestError {
    /// Returns which class of failure this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RequestLine(_) | Self::Header(_) | Self::InvalidContentLength(_) => {
                ErrorKind::Malformed
            }
            Self::ContentLengthExceeded { .. } | Self::TooLarge { .. } => {
                ErrorKind::LengthViolation
            }
            Self::Incomplete => ErrorKind::Incomplete,
            Self::Io(_) => ErrorKind::Transport,
        }
    }
}

/// Where a [`Request`] is in its parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// Waiting for the request line.
    Initialized,
    /// Consuming header field lines.
    ParsingHeaders,
    /// Accumulating the body; `received` counts body bytes so far.
    ParsingBody { received: usize },
    /// Complete. Nothing more is consumed.
    Done,
}

/// An HTTP/1.1 request, built up in place as bytes arrive.
///
/// # Examples
///
/// ```
/// use httpfromtcp::http::Request;
///
/// let raw = b"POST /coffee HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";
/// let mut request = Request::new();
///
/// // Bytes can arrive in any split.
/// let first = request.parse(&raw[..10]).unwrap();
/// assert_eq!(first, 0);
/// let consumed = request.parse(raw).unwrap();
///
/// assert_eq!(consumed, raw.len());
/// assert!(request.is_done());
/// assert_eq!(request.method(), "POST");
/// assert_eq!(request.header("Content-Length"), Some("5"));
/// assert_eq!(request.body(), b"hello");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    request_line: Option<RequestLine>,
    headers: Headers,
    body: BytesMut,
    state: ParseState,
}

impl Default for Request {
    fn default() -> Self {
        Self::new()
    }
}

impl Request {
    /// Creates an empty request in the [`ParseState::Initialized`] state.
    pub fn new() -> Self {
        Self {
            request_line: None,
            headers: Headers::new(),
            body: BytesMut::new(),
            state: ParseState::Initialized,
        }
    }

    /// Consumes as much of `data` as the current state allows.
    ///
    /// Returns the total bytes consumed. Zero means the request is either done
    /// or blocked until more bytes arrive; the caller must keep the unconsumed
    /// tail and pass it again, extended, on the next call.
    ///
    /// # Errors
    ///
    /// Any [`RequestError`] is terminal for this request.
    pub fn parse(&mut self, data: &[u8]) -> Result<usize, RequestError> {
        let mut total = 0;

        while self.state != ParseState::Done {
            let n = self.parse_single(&data[total..])?;
            if n == 0 {
                break;
            }
            total += n;
        }

        Ok(total)
    }

    fn parse_single(&mut self, data: &[u8]) -> Result<usize, RequestError> {
        match self.state {
            ParseState::Initialized => {
                let Some((line, consumed)) = RequestLine::parse(data)? else {
                    return Ok(0);
                };
                trace!(
                    method = line.method(),
                    target = line.target(),
                    consumed,
                    "parsed request line"
                );
                self.request_line = Some(line);
                self.state = ParseState::ParsingHeaders;
                Ok(consumed)
            }
            ParseState::ParsingHeaders => {
                let line = self.headers.parse(data)?;
                if line == HeaderLine::End {
                    trace!(headers = self.headers.len(), "end of header block");
                    self.state = ParseState::ParsingBody { received: 0 };
                }
                Ok(line.consumed())
            }
            ParseState::ParsingBody { received } => {
                let Some(declared) = self.content_length()? else {
                    self.state = ParseState::Done;
                    return Ok(data.len());
                };

                let received = received + data.len();
                if received > declared {
                    return Err(RequestError::ContentLengthExceeded { declared, received });
                }

                self.body.extend_from_slice(data);
                self.state = if received == declared {
                    trace!(length = declared, "body complete");
                    ParseState::Done
                } else {
                    ParseState::ParsingBody { received }
                };
                Ok(data.len())
            }
            ParseState::Done => Ok(0),
        }
    }

    /// Returns the parsed `Content-Length`, or `None` if the header is absent.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidContentLength`] if the value is not a
    /// non-negative decimal integer.
    pub fn content_length(&self) -> Result<Option<usize>, RequestError> {
        let Some(value) = self.headers.get("content-length") else {
            return Ok(None);
        };
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RequestError::InvalidContentLength(value.to_owned()));
        }
        value
            .parse()
            .map(Some)
            .map_err(|_| RequestError::InvalidContentLength(value.to_owned()))
    }

    /// Returns the current parse state.
    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Returns `true` once the request is complete.
    pub fn is_done(&self) -> bool {
        self.state == ParseState::Done
    }

    /// Returns the request line, once it has been parsed.
    pub fn request_line(&self) -> Option<&RequestLine> {
        self.request_line.as_ref()
    }

    /// Returns the request method, or `""` before the request line is parsed.
    pub fn method(&self) -> &str {
        self.request_line.as_ref().map_or("", RequestLine::method)
    }

    /// Returns the request target, or `""` before the request line is parsed.
    pub fn target(&self) -> &str {
        self.request_line.as_ref().map_or("", RequestLine::target)
    }

    /// Returns the HTTP version (e.g. `1.1`), or `""` before the request line is parsed.
    pub fn version(&self) -> &str {
        self.request_line.as_ref().map_or("", RequestLine::version)
    }

    /// Returns the request headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Looks up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Returns the body bytes received so far.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Consumes the request, returning its body.
    pub fn into_body(self) -> Bytes {
        self.body.freeze()
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(line) = &self.request_line {
            write!(f, "{line}")?;
        }
        writeln!(f, "Headers:")?;
        write!(f, "{}", self.headers)?;
        writeln!(f, "Body:")?;
        write!(f, "{}", String::from_utf8_lossy(&self.body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(raw: &[u8]) -> Result<Request, RequestError> {
        let mut req = Request::new();
        let consumed = req.parse(raw)?;
        assert!(consumed <= raw.len());
        Ok(req)
    }

    /// Feeds `raw` in `chunk`-byte reads, keeping unconsumed bytes like a reader would.
    fn parse_chunked(raw: &[u8], chunk: usize) -> Result<Request, RequestError> {
        let mut req = Request::new();
        let mut pending = Vec::new();
        for piece in raw.chunks(chunk) {
            pending.extend_from_slice(piece);
            let consumed = req.parse(&pending)?;
            pending.drain(..consumed);
            if req.is_done() {
                break;
            }
        }
        Ok(req)
    }

    #[test]
    fn parse_simple_get() {
        let raw = b"GET / HTTP/1.1\r\nHost: localhost:42069\r\nUser-Agent: curl/7.81.0\r\nAccept: */*\r\n\r\n";
        let req = parse_all(raw).unwrap();
        assert!(req.is_done());
        assert_eq!(req.method(), "GET");
        assert_eq!(req.target(), "/");
        assert_eq!(req.version(), "1.1");
        assert_eq!(req.header("host"), Some("localhost:42069"));
        assert_eq!(req.header("User-Agent"), Some("curl/7.81.0"));
        assert!(req.body().is_empty());
    }

    #[test]
    fn body_with_content_length() {
        let raw = b"POST /submit HTTP/1.1\r\nHost: localhost:42069\r\nContent-Length: 13\r\n\r\nhello world!\n";
        let req = parse_all(raw).unwrap();
        assert!(req.is_done());
        assert_eq!(req.body(), b"hello world!\n");
        assert_eq!(req.content_length().unwrap(), Some(13));
    }

    #[test]
    fn chunk_size_invariance() {
        let raw = b"POST /submit HTTP/1.1\r\nHost: localhost\r\nX-Tag: a\r\nX-Tag: b\r\nContent-Length: 11\r\n\r\nhello world";
        let whole = parse_all(raw).unwrap();
        for chunk in 1..=raw.len() {
            let req = parse_chunked(raw, chunk).unwrap();
            assert_eq!(req, whole, "chunk size {chunk}");
        }
    }

    #[test]
    fn partial_body_waits() {
        let raw = b"POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\nhello";
        let mut req = Request::new();
        assert_eq!(req.parse(raw).unwrap(), raw.len());
        assert_eq!(req.state(), ParseState::ParsingBody { received: 5 });
        assert_eq!(req.parse(b"").unwrap(), 0);
        assert_eq!(req.parse(b"world").unwrap(), 5);
        assert!(req.is_done());
        assert_eq!(req.body(), b"helloworld");
    }

    #[test]
    fn no_content_length_finishes_without_body() {
        let raw = b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n";
        let mut req = Request::new();
        req.parse(&raw[..raw.len() - 2]).unwrap();
        assert_eq!(req.state(), ParseState::ParsingHeaders);

        let mut req = Request::new();
        assert_eq!(req.parse(raw).unwrap(), raw.len());
        assert_eq!(req.state(), ParseState::Done);
        assert!(req.body().is_empty());
    }

    #[test]
    fn zero_content_length() {
        let req = parse_all(b"POST / HTTP/1.1\r\nContent-Length: 0\r\n\r\n").unwrap();
        assert!(req.is_done());
        assert!(req.body().is_empty());
    }

    #[test]
    fn done_consumes_nothing_more() {
        let raw = b"GET / HTTP/1.1\r\n\r\n";
        let mut req = Request::new();
        req.parse(raw).unwrap();
        assert!(req.is_done());
        let before = req.clone();
        assert_eq!(req.parse(b"GET /again HTTP/1.1\r\n\r\n").unwrap(), 0);
        assert_eq!(req, before);
    }

    #[test]
    fn body_longer_than_content_length() {
        let raw = b"POST / HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello!!";
        let err = parse_all(raw).unwrap_err();
        assert!(matches!(
            err,
            RequestError::ContentLengthExceeded {
                declared: 5,
                received: 7
            }
        ));
        assert_eq!(err.kind(), ErrorKind::LengthViolation);
    }

    #[test]
    fn non_numeric_content_length() {
        let raw = b"POST / HTTP/1.1\r\nContent-Length: five\r\n\r\nhello";
        let err = parse_all(raw).unwrap_err();
        assert!(matches!(err, RequestError::InvalidContentLength(ref v) if v == "five"));
        assert_eq!(err.kind(), ErrorKind::Malformed);

        let raw = b"POST / HTTP/1.1\r\nContent-Length: -1\r\n\r\n";
        assert!(matches!(
            parse_all(raw),
            Err(RequestError::InvalidContentLength(_))
        ));
    }

    #[test]
    fn malformed_request_line() {
        let err = parse_all(b"/coffee HTTP/1.1\r\nHost: localhost\r\n\r\n").unwrap_err();
        assert!(matches!(
            err,
            RequestError::RequestLine(RequestLineError::FieldCount(2))
        ));
        assert_eq!(err.kind(), ErrorKind::Malformed);
    }

    #[test]
    fn malformed_header() {
        let err = parse_all(b"GET / HTTP/1.1\r\nHost localhost\r\n\r\n").unwrap_err();
        assert!(matches!(
            err,
            RequestError::Header(HeaderError::MissingSeparator)
        ));
    }

    #[test]
    fn duplicate_headers_merged() {
        let raw = b"GET / HTTP/1.1\r\nHost: example.com\r\nHost: example.org\r\n\r\n";
        let req = parse_all(raw).unwrap();
        assert_eq!(req.header("host"), Some("example.com, example.org"));
    }

    #[test]
    fn display_dump() {
        let raw = b"POST /coffee HTTP/1.1\r\nHost: localhost\r\nContent-Length: 2\r\n\r\nhi";
        let req = parse_all(raw).unwrap();
        assert_eq!(
            req.to_string(),
            "Request line:\n- Method: POST\n- Target: /coffee\n- Version: 1.1\n\
             Headers:\n- content-length: 2\n- host: localhost\n\
             Body:\nhi"
        );
    }

    #[test]
    fn into_body_freezes() {
        let req = parse_all(b"PUT / HTTP/1.1\r\nContent-Length: 3\r\n\r\nabc").unwrap();
        assert_eq!(req.into_body(), Bytes::from_static(b"abc"));
    }
}
