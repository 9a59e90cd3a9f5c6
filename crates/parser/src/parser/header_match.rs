//! Streaming recognition of the header names and values that affect framing.
//!
//! Names are matched while they arrive, one lowercased byte at a time, so the machine never
//! has to buffer a header name just to compare it once the `:` shows up.

use crate::ensure;
use crate::protocol::ParseErrorKind;

/// A header that changes how the message is framed or whether the connection is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownHeader {
    Connection,
    ProxyConnection,
    ContentLength,
    TransferEncoding,
    Upgrade,
}

impl KnownHeader {
    const ALL: [KnownHeader; 5] =
        [KnownHeader::Connection, KnownHeader::ProxyConnection, KnownHeader::ContentLength, KnownHeader::TransferEncoding, KnownHeader::Upgrade];

    /// Lowercase wire name.
    pub fn literal(self) -> &'static [u8] {
        match self {
            KnownHeader::Connection => b"connection",
            KnownHeader::ProxyConnection => b"proxy-connection",
            KnownHeader::ContentLength => b"content-length",
            KnownHeader::TransferEncoding => b"transfer-encoding",
            KnownHeader::Upgrade => b"upgrade",
        }
    }
}

/// Progress of the header-name recognizer.
///
/// Reset with [`HeaderMatch::new`] whenever a new header field starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderMatch {
    /// Not one of the known headers.
    General,
    /// The first `matched` bytes agree with `candidate`.
    Matching { candidate: KnownHeader, matched: u8 },
    /// The whole name matched.
    Matched(KnownHeader),
}

impl Default for HeaderMatch {
    fn default() -> Self {
        Self::new()
    }
}

impl HeaderMatch {
    /// State before the first name byte.
    pub const fn new() -> Self {
        HeaderMatch::Matching { candidate: KnownHeader::Connection, matched: 0 }
    }

    /// Feeds one lowercased name byte.
    ///
    /// On a mismatch the recognizer moves to another candidate sharing the prefix read so far
    /// (`con` continues as either `connection` or `content-length`), or gives up.
    #[must_use]
    pub fn advance(self, lower: u8) -> Self {
        let HeaderMatch::Matching { candidate, matched } = self else {
            // a matched name followed by more bytes is some other header
            return HeaderMatch::General;
        };

        let index = matched as usize;
        let prefix = &candidate.literal()[..index];
        let next = if candidate.literal()[index] == lower {
            Some(candidate)
        } else {
            KnownHeader::ALL.into_iter().find(|alt| {
                let literal = alt.literal();
                literal.len() > index && literal[index] == lower && &literal[..index] == prefix
            })
        };

        match next {
            Some(header) if index + 1 == header.literal().len() => HeaderMatch::Matched(header),
            Some(header) => HeaderMatch::Matching { candidate: header, matched: matched + 1 },
            None => HeaderMatch::General,
        }
    }

    /// Runs the recognizer over a whole name. Mostly useful for tests and diagnostics.
    pub fn recognize(name: &[u8]) -> Option<KnownHeader> {
        match name.iter().fold(HeaderMatch::new(), |state, b| state.advance(b.to_ascii_lowercase())) {
            HeaderMatch::Matched(header) => Some(header),
            _ => None,
        }
    }

    #[inline]
    pub fn matched(self) -> Option<KnownHeader> {
        match self {
            HeaderMatch::Matched(header) => Some(header),
            _ => None,
        }
    }
}

/// Header values whose exact spelling changes framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueToken {
    Chunked,
    KeepAlive,
    Close,
}

impl ValueToken {
    fn literal(self) -> &'static [u8] {
        match self {
            ValueToken::Chunked => b"chunked",
            ValueToken::KeepAlive => b"keep-alive",
            ValueToken::Close => b"close",
        }
    }
}

/// Progress of matching the value of a recognized header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueMatch {
    General,
    /// Value of `Transfer-Encoding`, before its first byte.
    TransferEncodingStart,
    /// Value of `Connection` or `Proxy-Connection`, before its first byte.
    ConnectionStart,
    UpgradeStart,
    /// Content-Length before its first digit.
    ContentLengthStart,
    ContentLengthNum,
    /// Content-Length after the digits, only whitespace may follow.
    ContentLengthWs,
    Token { token: ValueToken, matched: u8 },
    /// The whole token matched, trailing whitespace keeps it.
    Complete(ValueToken),
}

impl ValueMatch {
    /// Starts matching one of `candidates` with the first lowercased value byte.
    pub(crate) fn start(candidates: &[ValueToken], lower: u8) -> Self {
        candidates
            .iter()
            .find(|token| token.literal()[0] == lower)
            .map_or(ValueMatch::General, |&token| ValueMatch::Token { token, matched: 1 })
    }

    /// Feeds one lowercased value byte after the first.
    #[must_use]
    pub(crate) fn advance(self, lower: u8) -> Self {
        match self {
            ValueMatch::Token { token, matched } => {
                let index = matched as usize;
                let literal = token.literal();
                if index < literal.len() && literal[index] == lower {
                    if index + 1 == literal.len() {
                        ValueMatch::Complete(token)
                    } else {
                        ValueMatch::Token { token, matched: matched + 1 }
                    }
                } else {
                    ValueMatch::General
                }
            }
            ValueMatch::Complete(_) if lower == b' ' || lower == b'\t' => self,
            ValueMatch::Complete(_) => ValueMatch::General,
            other => other,
        }
    }

    /// The token fully matched by the value, if any.
    #[cfg(test)]
    fn complete(self) -> Option<ValueToken> {
        match self {
            ValueMatch::Complete(token) => Some(token),
            _ => None,
        }
    }
}

/// Appends one decimal digit to a Content-Length value.
///
/// The guard is conservative: it refuses to grow once another digit could overflow.
pub(crate) fn push_length_digit(current: u64, byte: u8) -> Result<u64, ParseErrorKind> {
    ensure!(byte.is_ascii_digit(), ParseErrorKind::InvalidContentLength);
    ensure!((u64::MAX - 10) / 10 >= current, ParseErrorKind::InvalidContentLength);
    Ok(current * 10 + u64::from(byte - b'0'))
}
