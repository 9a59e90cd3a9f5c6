//! The fixed table of request methods understood by the parser.
//!
//! Methods are recognized byte by byte. The first byte picks a candidate, later bytes either
//! confirm it or branch to a sibling that shares the prefix read so far (see [`Method::branch`]).

use crate::protocol::{ParseError, ParseErrorKind};

#[allow(clippy::upper_case_acronyms, reason = "variants mirror the wire names")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    DELETE,
    GET,
    HEAD,
    POST,
    PUT,
    CONNECT,
    OPTIONS,
    TRACE,
    COPY,
    LOCK,
    MKCOL,
    MOVE,
    PROPFIND,
    PROPPATCH,
    SEARCH,
    UNLOCK,
    BIND,
    REBIND,
    UNBIND,
    ACL,
    REPORT,
    MKACTIVITY,
    CHECKOUT,
    MERGE,
    MSEARCH,
    NOTIFY,
    SUBSCRIBE,
    UNSUBSCRIBE,
    PATCH,
    PURGE,
    MKCALENDAR,
    LINK,
    UNLINK,
    SOURCE,
}

impl Method {
    /// Every method, in table order.
    pub const ALL: [Method; 34] = [
        Method::DELETE,
        Method::GET,
        Method::HEAD,
        Method::POST,
        Method::PUT,
        Method::CONNECT,
        Method::OPTIONS,
        Method::TRACE,
        Method::COPY,
        Method::LOCK,
        Method::MKCOL,
        Method::MOVE,
        Method::PROPFIND,
        Method::PROPPATCH,
        Method::SEARCH,
        Method::UNLOCK,
        Method::BIND,
        Method::REBIND,
        Method::UNBIND,
        Method::ACL,
        Method::REPORT,
        Method::MKACTIVITY,
        Method::CHECKOUT,
        Method::MERGE,
        Method::MSEARCH,
        Method::NOTIFY,
        Method::SUBSCRIBE,
        Method::UNSUBSCRIBE,
        Method::PATCH,
        Method::PURGE,
        Method::MKCALENDAR,
        Method::LINK,
        Method::UNLINK,
        Method::SOURCE,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Method::DELETE => "DELETE",
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::CONNECT => "CONNECT",
            Method::OPTIONS => "OPTIONS",
            Method::TRACE => "TRACE",
            Method::COPY => "COPY",
            Method::LOCK => "LOCK",
            Method::MKCOL => "MKCOL",
            Method::MOVE => "MOVE",
            Method::PROPFIND => "PROPFIND",
            Method::PROPPATCH => "PROPPATCH",
            Method::SEARCH => "SEARCH",
            Method::UNLOCK => "UNLOCK",
            Method::BIND => "BIND",
            Method::REBIND => "REBIND",
            Method::UNBIND => "UNBIND",
            Method::ACL => "ACL",
            Method::REPORT => "REPORT",
            Method::MKACTIVITY => "MKACTIVITY",
            Method::CHECKOUT => "CHECKOUT",
            Method::MERGE => "MERGE",
            Method::MSEARCH => "M-SEARCH",
            Method::NOTIFY => "NOTIFY",
            Method::SUBSCRIBE => "SUBSCRIBE",
            Method::UNSUBSCRIBE => "UNSUBSCRIBE",
            Method::PATCH => "PATCH",
            Method::PURGE => "PURGE",
            Method::MKCALENDAR => "MKCALENDAR",
            Method::LINK => "LINK",
            Method::UNLINK => "UNLINK",
            Method::SOURCE => "SOURCE",
        }
    }

    #[inline]
    pub fn as_bytes(self) -> &'static [u8] {
        self.as_str().as_bytes()
    }

    /// Picks the first candidate for a request line starting with `byte`.
    ///
    /// Methods sharing the first byte are reached later through [`Method::branch`].
    pub(crate) fn from_first_byte(byte: u8) -> Option<Method> {
        let method = match byte {
            b'A' => Method::ACL,
            b'B' => Method::BIND,
            b'C' => Method::CONNECT,
            b'D' => Method::DELETE,
            b'G' => Method::GET,
            b'H' => Method::HEAD,
            b'L' => Method::LOCK,
            b'M' => Method::MKCOL,
            b'N' => Method::NOTIFY,
            b'O' => Method::OPTIONS,
            b'P' => Method::POST,
            b'R' => Method::REPORT,
            b'S' => Method::SUBSCRIBE,
            b'T' => Method::TRACE,
            b'U' => Method::UNLOCK,
            _ => return None,
        };
        Some(method)
    }

    /// Switches to the sibling method that continues with `byte` at `index`.
    ///
    /// Only called once `byte` failed to match `self` at `index`; every returned method shares
    /// the first `index` bytes with `self`.
    pub(crate) fn branch(self, index: usize, byte: u8) -> Option<Method> {
        let method = match (self, index, byte) {
            (Method::POST, 1, b'U') => Method::PUT,
            (Method::POST, 1, b'A') => Method::PATCH,
            (Method::POST, 1, b'R') => Method::PROPFIND,
            (Method::PUT, 2, b'R') => Method::PURGE,
            (Method::CONNECT, 1, b'H') => Method::CHECKOUT,
            (Method::CONNECT, 2, b'P') => Method::COPY,
            (Method::MKCOL, 1, b'O') => Method::MOVE,
            (Method::MKCOL, 1, b'E') => Method::MERGE,
            (Method::MKCOL, 1, b'-') => Method::MSEARCH,
            (Method::MKCOL, 2, b'A') => Method::MKACTIVITY,
            (Method::MKCOL, 3, b'A') => Method::MKCALENDAR,
            (Method::SUBSCRIBE, 1, b'E') => Method::SEARCH,
            (Method::SUBSCRIBE, 1, b'O') => Method::SOURCE,
            (Method::REPORT, 2, b'B') => Method::REBIND,
            (Method::PROPFIND, 4, b'P') => Method::PROPPATCH,
            (Method::LOCK, 1, b'I') => Method::LINK,
            (Method::UNLOCK, 2, b'S') => Method::UNSUBSCRIBE,
            (Method::UNLOCK, 2, b'B') => Method::UNBIND,
            (Method::UNLOCK, 3, b'I') => Method::UNLINK,
            _ => return None,
        };
        Some(method)
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&[u8]> for Method {
    type Error = ParseError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Method::ALL
            .into_iter()
            .find(|method| method.as_bytes() == bytes)
            .ok_or_else(|| ParseErrorKind::InvalidMethod.into())
    }
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::DELETE => http::Method::DELETE,
            Method::GET => http::Method::GET,
            Method::HEAD => http::Method::HEAD,
            Method::POST => http::Method::POST,
            Method::PUT => http::Method::PUT,
            Method::CONNECT => http::Method::CONNECT,
            Method::OPTIONS => http::Method::OPTIONS,
            Method::TRACE => http::Method::TRACE,
            Method::PATCH => http::Method::PATCH,
            // the extension methods are all plain tokens, `from_bytes` cannot reject them
            other => http::Method::from_bytes(other.as_bytes()).unwrap_or_default(),
        }
    }
}
