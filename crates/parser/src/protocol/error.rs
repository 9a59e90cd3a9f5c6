use std::io;
use thiserror::Error;

/// The reason a byte stream could not be framed.
///
/// Every kind is fatal for the parser instance that produced it.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    #[error("invalid http method")]
    InvalidMethod,

    #[error("invalid http version")]
    InvalidVersion,

    #[error("invalid response status")]
    InvalidStatus,

    #[error("invalid character in header")]
    InvalidHeaderToken,

    #[error("invalid content-length header")]
    InvalidContentLength,

    #[error("duplicate content-length header")]
    UnexpectedContentLength,

    #[error("invalid chunk size")]
    InvalidChunkSize,

    #[error("header size exceed the limit")]
    HeaderOverflow,

    #[error("invalid url")]
    InvalidUrl,

    #[error("invalid constant string")]
    InvalidConstant,

    #[error("LF character expected")]
    LfExpected,

    #[error("stream ended at an unexpected time")]
    InvalidEofState,

    #[error("the on_* callback aborted parsing")]
    CallbackAborted,

    #[error("data received after completed connection: close message")]
    ClosedConnection,
}

/// A parse failure together with the position at which it was detected.
///
/// `consumed` is the number of bytes of the failing `feed` call that were accepted
/// before the offending byte, so `input[consumed]` is the byte that was rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{kind} (at byte {consumed})")]
pub struct ParseError {
    kind: ParseErrorKind,
    consumed: usize,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, consumed: usize) -> Self {
        Self { kind, consumed }
    }

    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    pub fn consumed(&self) -> usize {
        self.consumed
    }

    pub fn invalid_url(consumed: usize) -> Self {
        Self::new(ParseErrorKind::InvalidUrl, consumed)
    }
}

impl From<ParseErrorKind> for ParseError {
    fn from(kind: ParseErrorKind) -> Self {
        Self::new(kind, 0)
    }
}

/// Error type of the [`MessageDecoder`](crate::codec::MessageDecoder) codec.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("parse error: {source}")]
    Parse {
        #[from]
        source: ParseError,
    },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl DecodeError {
    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    /// Returns the parse error kind, if this error came from the parser.
    pub fn parse_kind(&self) -> Option<ParseErrorKind> {
        match self {
            DecodeError::Parse { source } => Some(source.kind()),
            DecodeError::Io { .. } => None,
        }
    }
}
