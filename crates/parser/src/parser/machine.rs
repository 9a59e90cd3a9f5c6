//! The per-byte HTTP/1.x message automaton.
//!
//! [`Machine::execute`] walks the input one byte at a time. A state either consumes the byte
//! ([`Step::Next`]) or hands the same byte to the state it just switched to ([`Step::Again`]),
//! which is how a delimiter is first detected and then acted upon. Bodies are consumed in
//! bulk with [`Step::Skip`].
//!
//! The machine never allocates and never keeps a reference to the input: spans of the input are
//! tracked as start offsets ([`Marks`]) and reported to the [`Callbacks`] before `execute`
//! returns.

use tracing::{debug, trace};

use crate::ensure;
use crate::parser::callbacks::{Action, Callbacks, Head};
use crate::parser::chars::{is_header_char, token, unhex};
use crate::parser::header_match::{HeaderMatch, KnownHeader, ValueMatch, ValueToken, push_length_digit};
use crate::parser::state::{ParseState, State};
use crate::parser::url::{UrlState, classify};
use crate::protocol::{Method, ParseError, ParseErrorKind, ParserMode};

/// Default limit for the start line plus header block, and for a trailer block.
pub const DEFAULT_MAX_HEADER_SIZE: usize = 80 * 1024;

/// Highest accepted major or minor version number.
const MAX_VERSION: u16 = 999;

/// Longest header name `http::HeaderName` accepts.
const MAX_HEADER_NAME_LEN: usize = 65535;

const HTTP_LITERAL: &[u8] = b"HTTP/";

/// Framing and connection flags derived from the header block.
#[allow(clippy::struct_excessive_bools, reason = "independent protocol flags")]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    /// `Transfer-Encoding: chunked` was seen.
    pub chunked: bool,
    /// An `Upgrade` header was seen.
    pub upgrade: bool,
    /// The message has no body regardless of its headers (response to HEAD).
    pub skip_body: bool,
    pub connection_keep_alive: bool,
    pub connection_close: bool,
    /// The terminal chunk was read and trailer headers are being parsed.
    pub trailing_headers: bool,
}

/// Outcome of processing one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// The byte was consumed.
    Next,
    /// Dispatch the same byte again against the new state.
    Again,
    /// `n` bytes starting at the current one were consumed.
    Skip(usize),
    /// The byte was consumed and parsing stops here, the rest belongs to another protocol.
    Exit,
}

/// Start offsets of the spans still open in the current input.
#[derive(Debug, Default)]
struct Marks {
    url: Option<usize>,
    status: Option<usize>,
    field: Option<usize>,
    value: Option<usize>,
    body: Option<usize>,
}

impl Marks {
    /// Re-opens the span the previous input ended in.
    fn resume(state: State) -> Self {
        let mut marks = Marks::default();
        match state {
            State::ReqUrl(_) => marks.url = Some(0),
            State::ResStatus => marks.status = Some(0),
            State::HeaderField => marks.field = Some(0),
            State::HeaderValue => marks.value = Some(0),
            _ => {}
        }
        marks
    }
}

/// Reports `data[mark..end]` through `$callback` and closes the mark.
macro_rules! emit {
    ($self:ident, $mark:expr, $cb:ident.$callback:ident, $data:ident, $end:expr) => {
        if let Some(start) = $mark.take() {
            if start < $end {
                let action = $cb.$callback(&$data[start..$end]);
                $self.apply(action)?;
            }
        }
    };
}

#[derive(Debug)]
pub(crate) struct Machine {
    mode: ParserMode,
    state: State,
    flags: Flags,
    max_header_size: usize,
    /// Bytes seen in the current header block.
    nread: usize,

    method: Option<Method>,
    /// Bytes matched of the method name or the `HTTP/` literal.
    index: usize,
    status_code: u16,
    status_digits: u8,
    http_major: u16,
    http_minor: u16,

    header_match: HeaderMatch,
    field_len: usize,
    value_match: ValueMatch,
    /// The current header produced at least one value byte.
    value_seen: bool,
    content_length: Option<u64>,
    /// Bytes left in the identity body or the current chunk.
    remaining: u64,
    upgrade: bool,

    paused: bool,
    error: Option<ParseErrorKind>,
}

impl Machine {
    pub(crate) fn new(mode: ParserMode, max_header_size: usize) -> Self {
        Self {
            mode,
            state: State::Start,
            flags: Flags::default(),
            max_header_size,
            nread: 0,
            method: None,
            index: 0,
            status_code: 0,
            status_digits: 0,
            http_major: 0,
            http_minor: 0,
            header_match: HeaderMatch::General,
            field_len: 0,
            value_match: ValueMatch::General,
            value_seen: false,
            content_length: None,
            remaining: 0,
            upgrade: false,
            paused: false,
            error: None,
        }
    }

    /// Returns to a fresh `Start` state, forgetting any error.
    pub(crate) fn reset(&mut self) {
        *self = Machine::new(self.mode, self.max_header_size);
    }

    pub(crate) fn mode(&self) -> ParserMode {
        self.mode
    }

    pub(crate) fn state(&self) -> ParseState {
        self.state.phase(self.mode == ParserMode::Request)
    }

    pub(crate) fn flags(&self) -> Flags {
        self.flags
    }

    pub(crate) fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    pub(crate) fn error(&self) -> Option<ParseErrorKind> {
        self.error
    }

    pub(crate) fn is_upgrade(&self) -> bool {
        self.upgrade
    }

    pub(crate) fn is_paused(&self) -> bool {
        self.paused
    }

    pub(crate) fn pause(&mut self) {
        self.paused = true;
    }

    pub(crate) fn resume(&mut self) {
        self.paused = false;
    }

    /// Marks the current or next message as bodyless, e.g. the response to a HEAD request.
    pub(crate) fn set_skip_body(&mut self, skip: bool) {
        self.flags.skip_body = skip;
    }

    /// Whether the connection may carry another message after the current one.
    pub(crate) fn should_keep_alive(&self) -> bool {
        let keep_alive = if self.http_major > 0 && self.http_minor > 0 {
            // HTTP/1.1
            !self.flags.connection_close
        } else {
            // HTTP/1.0 or earlier
            self.flags.connection_keep_alive
        };
        keep_alive && !self.needs_eof()
    }

    /// Whether the body can only be delimited by the connection closing.
    fn needs_eof(&self) -> bool {
        if self.mode == ParserMode::Request {
            return false;
        }
        if self.status_code / 100 == 1 || self.status_code == 204 || self.status_code == 304 || self.flags.skip_body {
            return false;
        }
        !self.flags.chunked && self.content_length.is_none()
    }

    fn head(&self) -> Head {
        Head {
            mode: self.mode,
            method: self.method,
            status_code: (self.mode == ParserMode::Response).then_some(self.status_code),
            http_major: self.http_major,
            http_minor: self.http_minor,
            flags: self.flags,
            content_length: self.content_length,
            should_keep_alive: self.should_keep_alive(),
            upgrade: self.upgrade,
        }
    }

    /// Parses `data`, reporting events to `cb`.
    ///
    /// Returns the number of bytes consumed. An empty `data` signals the end of the stream.
    pub(crate) fn execute<C: Callbacks>(&mut self, cb: &mut C, data: &[u8]) -> Result<usize, ParseError> {
        if let Some(kind) = self.error {
            return Err(ParseError::new(kind, 0));
        }
        // the stream ends only once, so EOF is not held back by a pause
        if data.is_empty() {
            return self.eof(cb).map(|()| 0);
        }
        if self.paused {
            return Ok(0);
        }
        if self.state == State::MessageDone {
            // upgraded, the rest of the stream is not http
            return Ok(0);
        }

        let mut marks = Marks::resume(self.state);
        let mut i = 0;

        while i < data.len() {
            if self.state.counts_header_bytes() {
                self.nread += 1;
                if self.nread > self.max_header_size {
                    return Err(self.fail(ParseErrorKind::HeaderOverflow, i));
                }
            }

            let step = loop {
                match self.step(cb, data, i, &mut marks) {
                    Ok(Step::Again) => {}
                    Ok(step) => break step,
                    Err(kind) => return Err(self.fail(kind, i)),
                }
            };

            match step {
                Step::Next | Step::Again => i += 1,
                Step::Skip(n) => i += n,
                Step::Exit => return Ok(i + 1),
            }

            if self.paused {
                break;
            }
        }

        if let Err(kind) = self.flush(cb, data, i, &mut marks) {
            return Err(self.fail(kind, i));
        }
        Ok(i)
    }

    fn eof<C: Callbacks>(&mut self, cb: &mut C) -> Result<(), ParseError> {
        match self.state {
            State::BodyIdentityEof => {
                trace!("connection closed, identity body complete");
                self.complete_message(cb).map(|_| ()).map_err(|kind| self.fail(kind, 0))
            }
            State::Start | State::Dead | State::MessageDone => Ok(()),
            _ => Err(self.fail(ParseErrorKind::InvalidEofState, 0)),
        }
    }

    /// Reports the spans still open at `end` of the input.
    fn flush<C: Callbacks>(&mut self, cb: &mut C, data: &[u8], end: usize, marks: &mut Marks) -> Result<(), ParseErrorKind> {
        emit!(self, marks.url, cb.on_url, data, end);
        emit!(self, marks.status, cb.on_status, data, end);
        emit!(self, marks.field, cb.on_header_field, data, end);
        emit!(self, marks.value, cb.on_header_value, data, end);
        emit!(self, marks.body, cb.on_body, data, end);
        Ok(())
    }

    fn fail(&mut self, kind: ParseErrorKind, consumed: usize) -> ParseError {
        debug!(?kind, consumed, state = ?self.state, "http parse error");
        self.error = Some(kind);
        self.state = State::Dead;
        ParseError::new(kind, consumed)
    }

    fn apply(&mut self, action: Action) -> Result<(), ParseErrorKind> {
        match action {
            Action::Continue => Ok(()),
            Action::Pause => {
                self.paused = true;
                Ok(())
            }
            Action::Abort => Err(ParseErrorKind::CallbackAborted),
        }
    }

    fn begin_message<C: Callbacks>(&mut self, cb: &mut C) -> Result<(), ParseErrorKind> {
        self.flags = Flags { skip_body: self.flags.skip_body, ..Flags::default() };
        self.method = None;
        self.index = 0;
        self.status_code = 0;
        self.status_digits = 0;
        self.http_major = 0;
        self.http_minor = 0;
        self.content_length = None;
        self.remaining = 0;
        self.upgrade = false;
        trace!(mode = ?self.mode, "message begin");
        let action = cb.on_message_begin();
        self.apply(action)
    }

    /// Fires `on_message_complete` and moves to the state for the next message.
    ///
    /// Returns true when parsing must stop because the connection was upgraded.
    fn complete_message<C: Callbacks>(&mut self, cb: &mut C) -> Result<bool, ParseErrorKind> {
        let keep_alive = self.should_keep_alive();
        self.nread = 0;
        self.flags.skip_body = false;

        self.state = if self.upgrade {
            State::MessageDone
        } else if keep_alive {
            State::Start
        } else {
            State::Dead
        };
        trace!(keep_alive, upgrade = self.upgrade, "message complete");

        let action = cb.on_message_complete();
        self.apply(action)?;
        Ok(self.upgrade)
    }

    fn step<C: Callbacks>(&mut self, cb: &mut C, data: &[u8], i: usize, marks: &mut Marks) -> Result<Step, ParseErrorKind> {
        let byte = data[i];

        match self.state {
            State::Dead => {
                // trailing empty lines after the last message are harmless
                ensure!(byte == b'\r' || byte == b'\n', ParseErrorKind::ClosedConnection);
            }

            State::Start => {
                if byte == b'\r' || byte == b'\n' {
                    return Ok(Step::Next);
                }
                match self.mode {
                    ParserMode::Request => {
                        let method = Method::from_first_byte(byte).ok_or(ParseErrorKind::InvalidMethod)?;
                        self.begin_message(cb)?;
                        self.method = Some(method);
                        self.index = 1;
                        self.state = State::ReqMethod;
                    }
                    ParserMode::Response => {
                        ensure!(byte == HTTP_LITERAL[0], ParseErrorKind::InvalidConstant);
                        self.begin_message(cb)?;
                        self.state = State::ResHttpLiteral(1);
                    }
                }
            }

            State::ReqMethod => {
                let method = self.method.ok_or(ParseErrorKind::InvalidMethod)?;
                let name = method.as_bytes();
                if byte == b' ' && self.index == name.len() {
                    self.state = State::ReqSpacesBeforeUrl;
                } else if self.index < name.len() && name[self.index] == byte {
                    // still on track
                } else if byte.is_ascii_uppercase() || byte == b'-' {
                    self.method = Some(method.branch(self.index, byte).ok_or(ParseErrorKind::InvalidMethod)?);
                } else {
                    return Err(ParseErrorKind::InvalidMethod);
                }
                self.index += 1;
            }

            State::ReqSpacesBeforeUrl => {
                if byte == b' ' {
                    return Ok(Step::Next);
                }
                let url = classify(UrlState::initial(self.method == Some(Method::CONNECT)), byte);
                ensure!(url != UrlState::Dead, ParseErrorKind::InvalidUrl);
                marks.url = Some(i);
                self.state = State::ReqUrl(url);
            }

            State::ReqUrl(url) => {
                if byte == b' ' {
                    ensure!(url.can_end(), ParseErrorKind::InvalidUrl);
                    emit!(self, marks.url, cb.on_url, data, i);
                    self.state = State::ReqHttpStart;
                } else {
                    let next = classify(url, byte);
                    ensure!(next != UrlState::Dead, ParseErrorKind::InvalidUrl);
                    self.state = State::ReqUrl(next);
                }
            }

            State::ReqHttpStart => match byte {
                b' ' => {}
                b'H' => self.state = State::ReqHttpLiteral(1),
                _ => return Err(ParseErrorKind::InvalidConstant),
            },

            State::ReqHttpLiteral(n) | State::ResHttpLiteral(n) => {
                let n = usize::from(n);
                ensure!(byte == HTTP_LITERAL[n], ParseErrorKind::InvalidConstant);
                self.state = if n + 1 == HTTP_LITERAL.len() {
                    State::FirstMajor
                } else {
                    #[allow(clippy::cast_possible_truncation, reason = "bounded by the literal length")]
                    let next = (n + 1) as u8;
                    match self.state {
                        State::ReqHttpLiteral(_) => State::ReqHttpLiteral(next),
                        _ => State::ResHttpLiteral(next),
                    }
                };
            }

            State::FirstMajor => {
                ensure!(byte.is_ascii_digit(), ParseErrorKind::InvalidVersion);
                self.http_major = u16::from(byte - b'0');
                self.state = State::Major;
            }

            State::Major => {
                if byte == b'.' {
                    self.state = State::FirstMinor;
                } else {
                    self.http_major = push_version_digit(self.http_major, byte)?;
                }
            }

            State::FirstMinor => {
                ensure!(byte.is_ascii_digit(), ParseErrorKind::InvalidVersion);
                self.http_minor = u16::from(byte - b'0');
                self.state = State::Minor;
            }

            State::Minor => match (self.mode, byte) {
                (ParserMode::Request, b'\r') => self.state = State::LineAlmostDone,
                (ParserMode::Request, b'\n') => self.state = State::HeaderFieldStart,
                (ParserMode::Response, b' ') => self.state = State::ResFirstStatusCode,
                _ => self.http_minor = push_version_digit(self.http_minor, byte)?,
            },

            State::ResFirstStatusCode => {
                if byte == b' ' {
                    return Ok(Step::Next);
                }
                ensure!(byte.is_ascii_digit(), ParseErrorKind::InvalidStatus);
                self.status_code = u16::from(byte - b'0');
                self.status_digits = 1;
                self.state = State::ResStatusCode;
            }

            State::ResStatusCode => match byte {
                b'0'..=b'9' => {
                    ensure!(self.status_digits < 3, ParseErrorKind::InvalidStatus);
                    self.status_code = self.status_code * 10 + u16::from(byte - b'0');
                    self.status_digits += 1;
                }
                b' ' => {
                    ensure!(self.status_digits == 3, ParseErrorKind::InvalidStatus);
                    self.state = State::ResStatusStart;
                }
                b'\r' | b'\n' => {
                    ensure!(self.status_digits == 3, ParseErrorKind::InvalidStatus);
                    self.state = State::ResStatusStart;
                    return Ok(Step::Again);
                }
                _ => return Err(ParseErrorKind::InvalidStatus),
            },

            State::ResStatusStart => match byte {
                b'\r' => self.state = State::LineAlmostDone,
                b'\n' => self.state = State::HeaderFieldStart,
                _ => {
                    marks.status = Some(i);
                    self.state = State::ResStatus;
                }
            },

            State::ResStatus => match byte {
                b'\r' => {
                    emit!(self, marks.status, cb.on_status, data, i);
                    self.state = State::LineAlmostDone;
                }
                b'\n' => {
                    emit!(self, marks.status, cb.on_status, data, i);
                    self.state = State::HeaderFieldStart;
                }
                _ => {}
            },

            State::LineAlmostDone => {
                ensure!(byte == b'\n', ParseErrorKind::LfExpected);
                self.state = State::HeaderFieldStart;
            }

            State::HeaderFieldStart => match byte {
                b'\r' => self.state = State::HeadersAlmostDone,
                b'\n' => {
                    // a bare LF ends the header block as well
                    self.state = State::HeadersAlmostDone;
                    return Ok(Step::Again);
                }
                _ => {
                    let lower = token(byte).ok_or(ParseErrorKind::InvalidHeaderToken)?;
                    marks.field = Some(i);
                    self.field_len = 1;
                    self.header_match = if self.flags.trailing_headers {
                        // trailers never change framing
                        HeaderMatch::General
                    } else {
                        HeaderMatch::new().advance(lower)
                    };
                    self.state = State::HeaderField;
                }
            },

            State::HeaderField => {
                if let Some(lower) = token(byte) {
                    self.field_len += 1;
                    ensure!(self.field_len <= MAX_HEADER_NAME_LEN, ParseErrorKind::HeaderOverflow);
                    self.header_match = self.header_match.advance(lower);
                } else if byte == b':' {
                    emit!(self, marks.field, cb.on_header_field, data, i);
                    self.begin_value()?;
                    self.state = State::HeaderValueDiscardWs;
                } else {
                    return Err(ParseErrorKind::InvalidHeaderToken);
                }
            }

            State::HeaderValueDiscardWs => match byte {
                b' ' | b'\t' => {}
                b'\r' => self.state = State::HeaderValueDiscardWsAlmostDone,
                b'\n' => self.state = State::HeaderValueDiscardLws,
                _ => {
                    self.state = State::HeaderValueStart;
                    return Ok(Step::Again);
                }
            },

            State::HeaderValueDiscardWsAlmostDone => {
                ensure!(byte == b'\n', ParseErrorKind::LfExpected);
                self.state = State::HeaderValueDiscardLws;
            }

            State::HeaderValueDiscardLws => {
                if byte == b' ' || byte == b'\t' {
                    self.state = State::HeaderValueDiscardWs;
                } else {
                    if !self.value_seen {
                        // the header value was empty
                        let action = cb.on_header_value(&[]);
                        self.apply(action)?;
                    }
                    self.finish_header()?;
                    self.state = State::HeaderFieldStart;
                    return Ok(Step::Again);
                }
            }

            State::HeaderValueStart => {
                ensure!(is_header_char(byte), ParseErrorKind::InvalidHeaderToken);
                marks.value = Some(i);
                self.value_seen = true;
                self.state = State::HeaderValue;
                self.start_value(byte)?;
            }

            State::HeaderValue => match byte {
                b'\r' => {
                    emit!(self, marks.value, cb.on_header_value, data, i);
                    self.state = State::HeaderAlmostDone;
                }
                b'\n' => {
                    emit!(self, marks.value, cb.on_header_value, data, i);
                    self.state = State::HeaderAlmostDone;
                    return Ok(Step::Again);
                }
                _ => {
                    ensure!(is_header_char(byte), ParseErrorKind::InvalidHeaderToken);
                    self.continue_value(byte)?;
                }
            },

            State::HeaderAlmostDone => {
                ensure!(byte == b'\n', ParseErrorKind::LfExpected);
                self.state = State::HeaderValueLws;
            }

            State::HeaderValueLws => {
                if byte == b' ' || byte == b'\t' {
                    // obsolete line folding continues the value, a single space replaces the fold
                    if self.value_match == ValueMatch::ContentLengthNum {
                        self.value_match = ValueMatch::ContentLengthWs;
                    }
                    let action = cb.on_header_value(b" ");
                    self.apply(action)?;
                    self.state = State::HeaderValueDiscardWs;
                } else {
                    self.finish_header()?;
                    self.state = State::HeaderFieldStart;
                    return Ok(Step::Again);
                }
            }

            State::HeadersAlmostDone => {
                ensure!(byte == b'\n', ParseErrorKind::LfExpected);
                self.state = if self.flags.trailing_headers {
                    // end of a chunked message
                    let action = cb.on_chunk_complete();
                    self.apply(action)?;
                    State::MessageDone
                } else {
                    State::HeadersDone
                };
                return Ok(Step::Again);
            }

            State::HeadersDone => return self.headers_done(cb),

            State::ChunkSizeStart => {
                self.remaining = u64::from(unhex(byte).ok_or(ParseErrorKind::InvalidChunkSize)?);
                self.state = State::ChunkSize;
            }

            State::ChunkSize => match byte {
                b'\r' => self.state = State::ChunkSizeAlmostDone,
                b';' | b' ' | b'\t' => self.state = State::ChunkParameters,
                _ => {
                    let digit = unhex(byte).ok_or(ParseErrorKind::InvalidChunkSize)?;
                    ensure!((u64::MAX - 16) / 16 >= self.remaining, ParseErrorKind::InvalidChunkSize);
                    self.remaining = self.remaining * 16 + u64::from(digit);
                }
            },

            State::ChunkParameters => match byte {
                // extensions are skipped verbatim up to the CR
                b'\r' => self.state = State::ChunkSizeAlmostDone,
                b'\n' => return Err(ParseErrorKind::InvalidChunkSize),
                _ => {}
            },

            State::ChunkSizeAlmostDone => {
                ensure!(byte == b'\n', ParseErrorKind::LfExpected);
                self.nread = 0;
                trace!(size = self.remaining, "chunk header");
                if self.remaining == 0 {
                    self.flags.trailing_headers = true;
                    self.state = State::HeaderFieldStart;
                } else {
                    self.state = State::ChunkData;
                }
                let action = cb.on_chunk_header(self.remaining);
                self.apply(action)?;
            }

            State::ChunkData => {
                let to_read = self.take_remaining(data.len() - i);
                marks.body.get_or_insert(i);
                if self.remaining == 0 {
                    self.state = State::ChunkDataAlmostDone;
                }
                return Ok(Step::Skip(to_read));
            }

            State::ChunkDataAlmostDone => {
                ensure!(byte == b'\r', ParseErrorKind::InvalidChunkSize);
                emit!(self, marks.body, cb.on_body, data, i);
                self.state = State::ChunkDataDone;
            }

            State::ChunkDataDone => {
                ensure!(byte == b'\n', ParseErrorKind::LfExpected);
                self.nread = 0;
                self.state = State::ChunkSizeStart;
                let action = cb.on_chunk_complete();
                self.apply(action)?;
            }

            State::BodyIdentity => {
                let to_read = self.take_remaining(data.len() - i);
                marks.body.get_or_insert(i);
                if self.remaining == 0 {
                    emit!(self, marks.body, cb.on_body, data, i + to_read);
                    self.complete_message(cb)?;
                }
                return Ok(Step::Skip(to_read));
            }

            State::BodyIdentityEof => {
                marks.body.get_or_insert(i);
                return Ok(Step::Skip(data.len() - i));
            }

            State::MessageDone => {
                let upgraded = self.complete_message(cb)?;
                return Ok(if upgraded { Step::Exit } else { Step::Next });
            }
        }

        Ok(Step::Next)
    }

    /// Consumes up to `available` bytes of the identity body or current chunk.
    fn take_remaining(&mut self, available: usize) -> usize {
        let to_read = usize::try_from(self.remaining).map_or(available, |remaining| remaining.min(available));
        self.remaining -= to_read as u64;
        to_read
    }

    /// Called on the `:` ending a header name.
    fn begin_value(&mut self) -> Result<(), ParseErrorKind> {
        self.value_seen = false;
        self.value_match = match self.header_match.matched() {
            Some(KnownHeader::ContentLength) => {
                ensure!(self.content_length.is_none(), ParseErrorKind::UnexpectedContentLength);
                ValueMatch::ContentLengthStart
            }
            Some(KnownHeader::TransferEncoding) => ValueMatch::TransferEncodingStart,
            Some(KnownHeader::Connection | KnownHeader::ProxyConnection) => ValueMatch::ConnectionStart,
            Some(KnownHeader::Upgrade) => ValueMatch::UpgradeStart,
            None => ValueMatch::General,
        };
        Ok(())
    }

    /// First value byte, also after a fold.
    fn start_value(&mut self, byte: u8) -> Result<(), ParseErrorKind> {
        self.value_match = match self.value_match {
            ValueMatch::UpgradeStart => {
                self.flags.upgrade = true;
                ValueMatch::General
            }
            ValueMatch::ContentLengthStart => {
                self.content_length = Some(push_length_digit(0, byte)?);
                ValueMatch::ContentLengthNum
            }
            // a fold may only add whitespace to a length
            ValueMatch::ContentLengthNum | ValueMatch::ContentLengthWs => return Err(ParseErrorKind::InvalidContentLength),
            ValueMatch::TransferEncodingStart => ValueMatch::start(&[ValueToken::Chunked], byte.to_ascii_lowercase()),
            ValueMatch::ConnectionStart => ValueMatch::start(&[ValueToken::KeepAlive, ValueToken::Close], byte.to_ascii_lowercase()),
            _ => ValueMatch::General,
        };
        Ok(())
    }

    fn continue_value(&mut self, byte: u8) -> Result<(), ParseErrorKind> {
        match self.value_match {
            ValueMatch::ContentLengthNum if byte == b' ' || byte == b'\t' => self.value_match = ValueMatch::ContentLengthWs,
            ValueMatch::ContentLengthNum => {
                let length = self.content_length.unwrap_or_default();
                self.content_length = Some(push_length_digit(length, byte)?);
            }
            ValueMatch::ContentLengthWs => ensure!(byte == b' ' || byte == b'\t', ParseErrorKind::InvalidContentLength),
            ValueMatch::General => {}
            other => self.value_match = other.advance(byte.to_ascii_lowercase()),
        }
        Ok(())
    }

    /// Applies the effect of a complete header line.
    fn finish_header(&mut self) -> Result<(), ParseErrorKind> {
        match self.value_match {
            // empty Content-Length
            ValueMatch::ContentLengthStart => return Err(ParseErrorKind::InvalidContentLength),
            ValueMatch::Complete(ValueToken::Chunked) => self.flags.chunked = true,
            ValueMatch::Complete(ValueToken::KeepAlive) => self.flags.connection_keep_alive = true,
            ValueMatch::Complete(ValueToken::Close) => self.flags.connection_close = true,
            _ => {}
        }
        self.value_match = ValueMatch::General;
        self.header_match = HeaderMatch::General;
        self.value_seen = false;
        Ok(())
    }

    /// Processes the LF ending the header block: decides how the body is framed.
    fn headers_done<C: Callbacks>(&mut self, cb: &mut C) -> Result<Step, ParseErrorKind> {
        self.nread = 0;
        self.upgrade = self.flags.upgrade || self.method == Some(Method::CONNECT);

        let body = if self.upgrade || self.flags.skip_body {
            None
        } else if self.flags.chunked {
            // chunked wins over any Content-Length
            self.content_length = None;
            Some(State::ChunkSizeStart)
        } else {
            match self.content_length {
                Some(0) => None,
                Some(length) => {
                    self.remaining = length;
                    Some(State::BodyIdentity)
                }
                None if self.needs_eof() => Some(State::BodyIdentityEof),
                None => None,
            }
        };

        let head = self.head();
        trace!(
            method = ?head.method,
            status = ?head.status_code,
            http_major = head.http_major,
            http_minor = head.http_minor,
            keep_alive = head.should_keep_alive,
            upgrade = head.upgrade,
            "headers complete"
        );
        let action = cb.on_headers_complete(&head);
        self.apply(action)?;

        match body {
            Some(state) => {
                self.state = state;
                Ok(Step::Next)
            }
            None => {
                let upgraded = self.complete_message(cb)?;
                Ok(if upgraded { Step::Exit } else { Step::Next })
            }
        }
    }
}

fn push_version_digit(current: u16, byte: u8) -> Result<u16, ParseErrorKind> {
    ensure!(byte.is_ascii_digit(), ParseErrorKind::InvalidVersion);
    let version = current * 10 + u16::from(byte - b'0');
    ensure!(version <= MAX_VERSION, ParseErrorKind::InvalidVersion);
    Ok(version)
}
