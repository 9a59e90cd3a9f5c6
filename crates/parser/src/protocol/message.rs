//! The owned result of parsing one HTTP message.
//!
//! A [`Message`] is assembled by [`Parser`](crate::parser::Parser) from the fragments the state
//! machine reports. Once complete it no longer borrows from any input buffer.

use bytes::Bytes;
use http::{HeaderMap, Request, Response, StatusCode, Uri, Version};

use crate::parser::{Url, parse_url};
use crate::protocol::{Method, ParseError};

/// Which side of the connection the parser reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserMode {
    /// Parse requests, as a server does.
    Request,
    /// Parse responses, as a client does.
    Response,
}

/// One HTTP request or response.
///
/// Fields are filled in as parsing progresses: the start line and headers become visible once
/// [`headers_complete`](Message::headers_complete) is true, the body once
/// [`body_complete`](Message::body_complete) is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub(crate) method: Option<Method>,
    pub(crate) status_code: Option<u16>,
    pub(crate) reason: Bytes,
    pub(crate) http_major: u16,
    pub(crate) http_minor: u16,
    pub(crate) headers: HeaderMap,
    pub(crate) trailers: HeaderMap,
    pub(crate) raw_url: Bytes,
    pub(crate) path: Bytes,
    pub(crate) query: Option<Bytes>,
    pub(crate) body: Bytes,
    pub(crate) content_length: Option<u64>,
    pub(crate) chunked: bool,
    pub(crate) headers_complete: bool,
    pub(crate) body_complete: bool,
    pub(crate) should_keep_alive: bool,
    pub(crate) upgrade: bool,
}

impl Message {
    /// Request method, `None` for a response.
    pub fn method(&self) -> Option<Method> {
        self.method
    }

    /// Response status code, `None` for a request.
    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.status_code.and_then(|code| StatusCode::from_u16(code).ok())
    }

    /// Reason phrase of a response, as sent.
    pub fn reason(&self) -> &[u8] {
        &self.reason
    }

    pub fn http_major(&self) -> u16 {
        self.http_major
    }

    pub fn http_minor(&self) -> u16 {
        self.http_minor
    }

    /// The protocol version, if it is one `http` knows about.
    pub fn version(&self) -> Option<Version> {
        match (self.http_major, self.http_minor) {
            (0, 9) => Some(Version::HTTP_09),
            (1, 0) => Some(Version::HTTP_10),
            (1, 1) => Some(Version::HTTP_11),
            (2, 0) => Some(Version::HTTP_2),
            (3, 0) => Some(Version::HTTP_3),
            _ => None,
        }
    }

    /// Header fields. When a name repeats, the first value is kept.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Fields received after the last chunk of a chunked body.
    pub fn trailers(&self) -> &HeaderMap {
        &self.trailers
    }

    /// The request target exactly as received.
    pub fn raw_url(&self) -> &[u8] {
        &self.raw_url
    }

    /// `raw_url` up to the first `?`.
    pub fn path(&self) -> &[u8] {
        &self.path
    }

    /// `raw_url` after the first `?`, a fragment included. [`url`](Message::url) separates
    /// the fragment.
    pub fn query(&self) -> Option<&[u8]> {
        self.query.as_deref()
    }

    /// Decomposes the request target.
    ///
    /// # Errors
    ///
    /// [`InvalidUrl`](crate::protocol::ParseErrorKind::InvalidUrl) when the target has no valid
    /// structured form, e.g. a malformed host.
    pub fn url(&self) -> Result<Url<'_>, ParseError> {
        parse_url(&self.raw_url, self.method == Some(Method::CONNECT))
    }

    /// The body with any chunked framing removed.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    pub fn is_chunked(&self) -> bool {
        self.chunked
    }

    pub fn headers_complete(&self) -> bool {
        self.headers_complete
    }

    pub fn body_complete(&self) -> bool {
        self.body_complete
    }

    /// Whether the connection may carry another message after this one.
    pub fn should_keep_alive(&self) -> bool {
        self.should_keep_alive
    }

    /// Whether the bytes after this message belong to another protocol.
    pub fn is_upgrade(&self) -> bool {
        self.upgrade
    }

    /// Converts a parsed request into an [`http::Request`].
    ///
    /// # Errors
    ///
    /// Fails when the message is a response or its target is not a valid [`Uri`].
    pub fn into_request(self) -> Result<Request<Bytes>, http::Error> {
        let method = match self.method {
            Some(method) => http::Method::from(method),
            // an empty method makes the builder report InvalidMethod
            None => return Request::builder().method("").body(self.body),
        };

        let version = self.version();
        let mut builder = Request::builder().method(method).uri(Uri::from_maybe_shared(self.raw_url)?);
        if let Some(version) = version {
            builder = builder.version(version);
        }
        let mut request = builder.body(self.body)?;
        *request.headers_mut() = self.headers;
        Ok(request)
    }

    /// Converts a parsed response into an [`http::Response`].
    ///
    /// # Errors
    ///
    /// Fails when the message is a request or its status code is outside `100..=999`.
    pub fn into_response(self) -> Result<Response<Bytes>, http::Error> {
        let mut builder = Response::builder().status(self.status_code.unwrap_or_default());
        if let Some(version) = self.version() {
            builder = builder.version(version);
        }
        let mut response = builder.body(self.body)?;
        *response.headers_mut() = self.headers;
        Ok(response)
    }

    /// Splits `raw_url` at its first `?` into path and query.
    pub(crate) fn split_target(&mut self) {
        match self.raw_url.iter().position(|&b| b == b'?') {
            Some(question) => {
                self.path = self.raw_url.slice(..question);
                self.query = Some(self.raw_url.slice(question + 1..));
            }
            None => {
                self.path = self.raw_url.clone();
                self.query = None;
            }
        }
    }
}
