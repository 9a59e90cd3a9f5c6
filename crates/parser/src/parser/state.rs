//! States of the message automaton.
//!
//! [`State`] is the granular per-byte state the machine dispatches on. [`ParseState`] groups
//! it into the phases a caller cares about.

use crate::parser::url::UrlState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum State {
    /// Closed after a message without keep-alive, or failed. Only CR/LF is tolerated.
    Dead,
    /// Between messages. Empty lines are skipped.
    Start,

    // request line
    ReqMethod,
    ReqSpacesBeforeUrl,
    ReqUrl(UrlState),
    ReqHttpStart,
    /// Inside the `HTTP/` literal, `index` bytes matched.
    ReqHttpLiteral(u8),

    // status line
    ResHttpLiteral(u8),
    ResFirstStatusCode,
    ResStatusCode,
    ResStatusStart,
    ResStatus,

    // version, shared by both start lines
    FirstMajor,
    Major,
    FirstMinor,
    Minor,
    LineAlmostDone,

    // header block, also used for trailers
    HeaderFieldStart,
    HeaderField,
    HeaderValueDiscardWs,
    HeaderValueDiscardWsAlmostDone,
    HeaderValueDiscardLws,
    HeaderValueStart,
    HeaderValue,
    HeaderAlmostDone,
    HeaderValueLws,
    HeadersAlmostDone,
    HeadersDone,

    // chunked body
    ChunkSizeStart,
    ChunkSize,
    ChunkParameters,
    ChunkSizeAlmostDone,
    ChunkData,
    ChunkDataAlmostDone,
    ChunkDataDone,

    // identity body
    BodyIdentity,
    BodyIdentityEof,

    /// The message is complete. Terminal after an upgrade.
    MessageDone,
}

/// Coarse phase of the parser, as reported by [`Parser::state`](crate::parser::Parser::state).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    Start,
    RequestLine(RequestLine),
    StatusLine(StatusLine),
    Headers(Headers),
    HeadersDone,
    Body(Body),
    MessageDone,
    Dead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestLine {
    Method,
    Url,
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLine {
    Version,
    Code,
    Reason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Headers {
    FieldStart,
    Field,
    ValueStart,
    Value,
    Lws,
    AlmostDone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Body {
    Identity,
    IdentityEof,
    Chunked(Chunked),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chunked {
    SizeStart,
    Size,
    Params,
    SizeAlmostDone,
    Data,
    DataAlmostDone,
    DataDone,
}

impl State {
    /// Whether the byte counter for the header-size limit runs in this state.
    #[inline]
    pub(crate) fn counts_header_bytes(self) -> bool {
        !matches!(
            self,
            State::Dead
                | State::MessageDone
                | State::BodyIdentity
                | State::BodyIdentityEof
                | State::ChunkSizeStart
                | State::ChunkSize
                | State::ChunkParameters
                | State::ChunkSizeAlmostDone
                | State::ChunkData
                | State::ChunkDataAlmostDone
                | State::ChunkDataDone
        )
    }

    /// `is_request` disambiguates the version states shared by both start lines.
    pub(crate) fn phase(self, is_request: bool) -> ParseState {
        match self {
            State::Dead => ParseState::Dead,
            State::Start => ParseState::Start,

            State::ReqMethod => ParseState::RequestLine(RequestLine::Method),
            State::ReqSpacesBeforeUrl | State::ReqUrl(_) => ParseState::RequestLine(RequestLine::Url),
            State::ReqHttpStart | State::ReqHttpLiteral(_) => ParseState::RequestLine(RequestLine::Version),

            State::ResHttpLiteral(_) => ParseState::StatusLine(StatusLine::Version),
            State::ResFirstStatusCode | State::ResStatusCode => ParseState::StatusLine(StatusLine::Code),
            State::ResStatusStart | State::ResStatus => ParseState::StatusLine(StatusLine::Reason),

            State::FirstMajor | State::Major | State::FirstMinor | State::Minor => {
                if is_request {
                    ParseState::RequestLine(RequestLine::Version)
                } else {
                    ParseState::StatusLine(StatusLine::Version)
                }
            }
            State::LineAlmostDone => {
                if is_request {
                    ParseState::RequestLine(RequestLine::Version)
                } else {
                    ParseState::StatusLine(StatusLine::Reason)
                }
            }

            State::HeaderFieldStart => ParseState::Headers(Headers::FieldStart),
            State::HeaderField => ParseState::Headers(Headers::Field),
            State::HeaderValueDiscardWs | State::HeaderValueDiscardWsAlmostDone | State::HeaderValueStart => {
                ParseState::Headers(Headers::ValueStart)
            }
            State::HeaderValue => ParseState::Headers(Headers::Value),
            State::HeaderValueDiscardLws | State::HeaderValueLws => ParseState::Headers(Headers::Lws),
            State::HeaderAlmostDone | State::HeadersAlmostDone => ParseState::Headers(Headers::AlmostDone),
            State::HeadersDone => ParseState::HeadersDone,

            State::ChunkSizeStart => ParseState::Body(Body::Chunked(Chunked::SizeStart)),
            State::ChunkSize => ParseState::Body(Body::Chunked(Chunked::Size)),
            State::ChunkParameters => ParseState::Body(Body::Chunked(Chunked::Params)),
            State::ChunkSizeAlmostDone => ParseState::Body(Body::Chunked(Chunked::SizeAlmostDone)),
            State::ChunkData => ParseState::Body(Body::Chunked(Chunked::Data)),
            State::ChunkDataAlmostDone => ParseState::Body(Body::Chunked(Chunked::DataAlmostDone)),
            State::ChunkDataDone => ParseState::Body(Body::Chunked(Chunked::DataDone)),

            State::BodyIdentity => ParseState::Body(Body::Identity),
            State::BodyIdentityEof => ParseState::Body(Body::IdentityEof),

            State::MessageDone => ParseState::MessageDone,
        }
    }
}
