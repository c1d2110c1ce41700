//! Drives a [`Request`] from an async byte stream.
//!
//! The loop owns a growable read buffer. Each read lands at the tail of the
//! buffer, the filled portion is handed to [`Request::parse`], and whatever
//! the request consumed is dropped from the front so the space is reused.

use bytes::{Buf, BytesMut};
use serde::Deserialize;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, trace};

use super::request::{Request, RequestError};

/// Default initial read buffer capacity, in bytes.
pub const DEFAULT_INITIAL_CAPACITY: usize = 8;

/// Default limit on buffered-but-unparsed bytes (8 MiB).
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 8 * 1024 * 1024;

/// Tuning for the read buffer used by [`read_request`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Capacity the buffer starts at. It doubles each time it fills up.
    pub initial_capacity: usize,
    /// Upper bound on bytes held in the buffer without being consumed.
    pub max_buffer_size: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
        }
    }
}

/// Reads one complete request from `reader`.
///
/// # Errors
///
/// - [`RequestError::Incomplete`] if the stream ends before the request is done.
/// - [`RequestError::TooLarge`] if unconsumed bytes reach `max_buffer_size`.
/// - [`RequestError::Io`] if a read fails.
/// - Any grammar or length error raised by [`Request::parse`].
pub async fn read_request<R>(reader: &mut R, config: &ReaderConfig) -> Result<Request, RequestError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut buf = BytesMut::with_capacity(config.initial_capacity.max(1));
    let mut request = Request::new();

    loop {
        if buf.len() == buf.capacity() {
            let additional = buf.capacity().max(1);
            buf.reserve(additional);
            trace!(capacity = buf.capacity(), "grew read buffer");
        }

        let bytes_read = reader.read_buf(&mut buf).await?;

        let consumed = request.parse(&buf)?;
        buf.advance(consumed);
        trace!(bytes_read, consumed, state = ?request.state(), "parse step");

        if request.is_done() {
            debug!(
                method = request.method(),
                target = request.target(),
                body_len = request.body().len(),
                "request complete"
            );
            return Ok(request);
        }

        if bytes_read == 0 && consumed == 0 {
            debug!(state = ?request.state(), buffered = buf.len(), "stream ended mid-request");
            return Err(RequestError::Incomplete);
        }

        if buf.len() >= config.max_buffer_size {
            return Err(RequestError::TooLarge {
                max_bytes: config.max_buffer_size,
            });
        }
    }
}

impl Request {
    /// Reads one complete request from `reader` with the default [`ReaderConfig`].
    ///
    /// # Examples
    ///
    /// ```
    /// use httpfromtcp::http::Request;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut stream: &[u8] = b"GET /coffee HTTP/1.1\r\nHost: localhost\r\n\r\n";
    /// let request = Request::from_reader(&mut stream).await?;
    /// assert_eq!(request.target(), "/coffee");
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// See [`read_request`].
    pub async fn from_reader<R>(reader: &mut R) -> Result<Self, RequestError>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        read_request(reader, &ReaderConfig::default()).await
    }
}
