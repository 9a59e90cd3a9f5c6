//! The public entry point: feeds byte slices through the state machine and assembles owned
//! [`Message`]s from the fragments it reports.
//!
//! # Example
//!
//! ```
//! use micro_http_parser::parser::Parser;
//! use micro_http_parser::protocol::ParserMode;
//!
//! let mut parser = Parser::new(ParserMode::Request);
//! let input = b"GET /index.html?x=1 HTTP/1.1\r\nHost: example.com\r\n\r\n";
//! assert_eq!(parser.feed(input).unwrap(), input.len());
//!
//! let message = parser.next_message().unwrap();
//! assert_eq!(message.path(), b"/index.html");
//! assert_eq!(message.query(), Some(&b"x=1"[..]));
//! assert!(message.should_keep_alive());
//! ```

use std::collections::VecDeque;
use std::mem;

use bytes::BytesMut;
use http::header::Entry;
use http::{HeaderName, HeaderValue};

use crate::parser::callbacks::{Action, Callbacks, Head};
use crate::parser::machine::{DEFAULT_MAX_HEADER_SIZE, Flags, Machine};
use crate::parser::state::ParseState;
use crate::protocol::{Message, ParseError, ParseErrorKind, ParserMode};

/// Tunables of a [`Parser`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Limit for the start line plus header block, and for a trailer block.
    pub max_header_size: usize,
    /// Pause as soon as a header block is complete, before any body byte is read.
    pub pause_after_headers: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self { max_header_size: DEFAULT_MAX_HEADER_SIZE, pause_after_headers: false }
    }
}

impl ParserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_header_size(mut self, max_header_size: usize) -> Self {
        self.max_header_size = max_header_size;
        self
    }

    #[must_use]
    pub fn with_pause_after_headers(mut self, pause: bool) -> Self {
        self.pause_after_headers = pause;
        self
    }
}

/// Incremental HTTP/1.x parser for one direction of one connection.
///
/// Bytes are pushed with [`feed`](Parser::feed) in whatever pieces the transport delivers.
/// Completed messages queue up and are pulled with [`next_message`](Parser::next_message), so
/// several pipelined messages in a single `feed` are never lost.
///
/// `H` receives every parse event as it happens, after the parser itself has recorded it. Its
/// answers can pause or abort parsing. The default `()` ignores all events.
#[derive(Debug)]
pub struct Parser<H: Callbacks = ()> {
    machine: Machine,
    collector: Collector<H>,
}

impl Parser<()> {
    pub fn new(mode: ParserMode) -> Self {
        Self::with_config(mode, ParserConfig::default(), ())
    }
}

impl<H: Callbacks> Parser<H> {
    pub fn with_hooks(mode: ParserMode, hooks: H) -> Self {
        Self::with_config(mode, ParserConfig::default(), hooks)
    }

    pub fn with_config(mode: ParserMode, config: ParserConfig, hooks: H) -> Self {
        Self { machine: Machine::new(mode, config.max_header_size), collector: Collector::new(hooks, config.pause_after_headers) }
    }

    /// Parses as much of `data` as possible and returns the number of bytes consumed.
    ///
    /// Fewer than `data.len()` bytes are consumed when parsing pauses, or when a message
    /// upgraded the connection: the remaining bytes then belong to the new protocol. While
    /// paused, and after an upgrade, `feed` consumes nothing.
    ///
    /// An empty `data` tells the parser the stream ended, see [`finish`](Parser::finish).
    ///
    /// # Errors
    ///
    /// A [`ParseError`] whose [`consumed`](ParseError::consumed) is the offset of the rejected
    /// byte. The parser is dead afterwards: every later call fails with the same kind.
    pub fn feed(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        self.machine.execute(&mut self.collector, data)
    }

    /// Signals the end of the stream. A response delimited by the connection closing is
    /// complete afterwards. This applies even while the parser is paused.
    ///
    /// # Errors
    ///
    /// [`InvalidEofState`](ParseErrorKind::InvalidEofState) when the stream ended inside a
    /// message.
    pub fn finish(&mut self) -> Result<(), ParseError> {
        self.feed(&[]).map(|_| ())
    }

    /// Takes the oldest completed message.
    pub fn next_message(&mut self) -> Option<Message> {
        self.collector.completed.pop_front()
    }

    /// Number of completed messages not yet taken.
    pub fn completed(&self) -> usize {
        self.collector.completed.len()
    }

    /// The message currently being parsed.
    ///
    /// Its start line and headers are filled in once the header block is complete; the body
    /// is attached on completion, when the message moves to the completed queue.
    pub fn message(&self) -> &Message {
        &self.collector.message
    }

    pub fn mode(&self) -> ParserMode {
        self.machine.mode()
    }

    pub fn state(&self) -> ParseState {
        self.machine.state()
    }

    pub fn flags(&self) -> Flags {
        self.machine.flags()
    }

    pub fn content_length(&self) -> Option<u64> {
        self.machine.content_length()
    }

    pub fn should_keep_alive(&self) -> bool {
        self.machine.should_keep_alive()
    }

    pub fn is_upgrade(&self) -> bool {
        self.machine.is_upgrade()
    }

    /// The error that killed the parser, if any.
    pub fn error(&self) -> Option<ParseErrorKind> {
        self.machine.error()
    }

    pub fn pause(&mut self) {
        self.machine.pause();
    }

    pub fn resume(&mut self) {
        self.machine.resume();
    }

    pub fn is_paused(&self) -> bool {
        self.machine.is_paused()
    }

    /// Treats the current or next response as bodyless, as needed for the response to a
    /// HEAD request. Cleared when that message completes.
    pub fn set_skip_body(&mut self, skip: bool) {
        self.machine.set_skip_body(skip);
    }

    /// Starts over as a fresh parser, forgetting any error, partial and queued messages.
    /// Buffer capacity is kept.
    pub fn reset(&mut self) {
        self.machine.reset();
        self.collector.reset();
    }

    pub fn hooks(&self) -> &H {
        &self.collector.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.collector.hooks
    }

    pub fn into_hooks(self) -> H {
        self.collector.hooks
    }
}

/// Copies the fragments reported by the machine into owned buffers, then forwards the event
/// to the user hooks.
#[derive(Debug)]
struct Collector<H> {
    hooks: H,
    pause_after_headers: bool,
    message: Message,
    url: BytesMut,
    reason: BytesMut,
    field: BytesMut,
    value: BytesMut,
    /// A field/value pair has started and is not yet stored.
    header_pending: bool,
    body: BytesMut,
    completed: VecDeque<Message>,
}

impl<H: Callbacks> Collector<H> {
    fn new(hooks: H, pause_after_headers: bool) -> Self {
        Self {
            hooks,
            pause_after_headers,
            message: Message::default(),
            url: BytesMut::new(),
            reason: BytesMut::new(),
            field: BytesMut::new(),
            value: BytesMut::new(),
            header_pending: false,
            body: BytesMut::new(),
            completed: VecDeque::new(),
        }
    }

    /// Clears per-message state, keeping allocations.
    fn clear(&mut self) {
        self.message = Message::default();
        self.url.clear();
        self.reason.clear();
        self.field.clear();
        self.value.clear();
        self.header_pending = false;
        self.body.clear();
    }

    fn reset(&mut self) {
        self.clear();
        self.completed.clear();
    }

    /// Stores the pending field/value pair, into the trailers once the header block is done.
    fn commit_header(&mut self) -> Action {
        if !self.header_pending {
            return Action::Continue;
        }
        self.header_pending = false;

        // the machine already dropped leading whitespace
        let len = self.value.iter().rposition(|&b| b != b' ' && b != b'\t').map_or(0, |last| last + 1);
        self.value.truncate(len);

        let name = HeaderName::from_bytes(&self.field);
        let value = HeaderValue::from_maybe_shared(self.value.split().freeze());
        self.field.clear();
        // the machine only reports token names of bounded length and valid value bytes
        let (Ok(name), Ok(value)) = (name, value) else {
            return Action::Abort;
        };

        let map = if self.message.headers_complete { &mut self.message.trailers } else { &mut self.message.headers };
        // first occurrence wins
        if let Entry::Vacant(entry) = map.entry(name) {
            entry.insert(value);
        }
        Action::Continue
    }
}

impl<H: Callbacks> Callbacks for Collector<H> {
    fn on_message_begin(&mut self) -> Action {
        self.clear();
        self.hooks.on_message_begin()
    }

    fn on_url(&mut self, url: &[u8]) -> Action {
        self.url.extend_from_slice(url);
        self.hooks.on_url(url)
    }

    fn on_status(&mut self, reason: &[u8]) -> Action {
        self.reason.extend_from_slice(reason);
        self.hooks.on_status(reason)
    }

    fn on_header_field(&mut self, field: &[u8]) -> Action {
        let action = self.commit_header();
        self.field.extend_from_slice(field);
        action.merge(self.hooks.on_header_field(field))
    }

    fn on_header_value(&mut self, value: &[u8]) -> Action {
        self.header_pending = true;
        self.value.extend_from_slice(value);
        self.hooks.on_header_value(value)
    }

    fn on_headers_complete(&mut self, head: &Head) -> Action {
        let action = self.commit_header();

        let message = &mut self.message;
        message.method = head.method;
        message.status_code = head.status_code;
        message.reason = self.reason.split().freeze();
        message.http_major = head.http_major;
        message.http_minor = head.http_minor;
        message.raw_url = self.url.split().freeze();
        message.split_target();
        message.content_length = head.content_length;
        message.chunked = head.flags.chunked;
        message.should_keep_alive = head.should_keep_alive;
        message.upgrade = head.upgrade;
        message.headers_complete = true;

        let action = if self.pause_after_headers { action.merge(Action::Pause) } else { action };
        action.merge(self.hooks.on_headers_complete(head))
    }

    fn on_body(&mut self, body: &[u8]) -> Action {
        self.body.extend_from_slice(body);
        self.hooks.on_body(body)
    }

    fn on_chunk_header(&mut self, size: u64) -> Action {
        self.hooks.on_chunk_header(size)
    }

    fn on_chunk_complete(&mut self) -> Action {
        self.hooks.on_chunk_complete()
    }

    fn on_message_complete(&mut self) -> Action {
        // last trailer field
        let action = self.commit_header();

        self.message.body = self.body.split().freeze();
        self.message.body_complete = true;
        self.completed.push_back(mem::take(&mut self.message));

        action.merge(self.hooks.on_message_complete())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::state::{Body, Headers};
    use crate::protocol::Method;
    use http::header::{CONNECTION, CONTENT_LENGTH, HOST};
    use indoc::indoc;
    use proptest::prelude::*;

    /// Normalizes the LF line endings of an `indoc!` fixture to CRLF.
    fn crlf(text: &str) -> Vec<u8> {
        text.replace('\n', "\r\n").into_bytes()
    }

    fn parse_one(mode: ParserMode, input: &[u8]) -> Message {
        let mut parser = Parser::new(mode);
        assert_eq!(parser.feed(input).unwrap(), input.len());
        let message = parser.next_message().expect("message should be complete");
        assert!(parser.next_message().is_none());
        message
    }

    fn fail(mode: ParserMode, input: &[u8]) -> ParseError {
        let mut parser = Parser::new(mode);
        let error = parser.feed(input).unwrap_err();
        assert_eq!(parser.error(), Some(error.kind()));
        assert_eq!(parser.state(), ParseState::Dead);
        error
    }

    /// Feeds `input` in pieces cut at `splits` and returns every completed message.
    fn parse_split(mode: ParserMode, input: &[u8], splits: &[usize]) -> Vec<Message> {
        let mut parser = Parser::new(mode);
        let mut start = 0;
        for &end in splits.iter().chain([input.len()].iter()) {
            let end = end.clamp(start, input.len());
            if end == start {
                // an empty feed would signal EOF
                continue;
            }
            assert_eq!(parser.feed(&input[start..end]).unwrap(), end - start);
            start = end;
        }
        std::iter::from_fn(|| parser.next_message()).collect()
    }

    #[test]
    fn request_with_query() {
        let input = crlf(indoc! {"
            GET /index.html?x=1 HTTP/1.1
            Host: example.com
            Connection: keep-alive

        "});
        let message = parse_one(ParserMode::Request, &input);

        assert_eq!(message.method(), Some(Method::GET));
        assert_eq!(message.raw_url(), b"/index.html?x=1");
        assert_eq!(message.path(), b"/index.html");
        assert_eq!(message.query(), Some(&b"x=1"[..]));
        assert_eq!(message.headers().len(), 2);
        assert_eq!(message.headers()[HOST], "example.com");
        assert_eq!(message.headers()[CONNECTION], "keep-alive");
        assert!(message.body().is_empty());
        assert!(message.headers_complete());
        assert!(message.body_complete());
        assert!(message.should_keep_alive());
        assert_eq!(message.version(), Some(http::Version::HTTP_11));
    }

    #[test]
    fn response_with_content_length() {
        let mut parser = Parser::new(ParserMode::Response);
        let head = b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\n";
        assert_eq!(parser.feed(head).unwrap(), head.len());
        assert_eq!(parser.state(), ParseState::Body(Body::Identity));
        assert!(parser.message().headers_complete());
        assert_eq!(parser.message().content_length(), Some(5));

        assert_eq!(parser.feed(b"hel").unwrap(), 3);
        assert!(parser.next_message().is_none());
        assert!(!parser.message().body_complete());

        assert_eq!(parser.feed(b"lo").unwrap(), 2);
        let message = parser.next_message().unwrap();
        assert_eq!(message.status_code(), Some(200));
        assert_eq!(message.status(), Some(http::StatusCode::OK));
        assert_eq!(message.reason(), b"OK");
        assert_eq!(message.body().as_ref(), b"hello");
        assert!(message.body_complete());
        assert_eq!(parser.state(), ParseState::Start);
    }

    #[test]
    fn identity_body_stops_at_content_length() {
        let mut parser = Parser::new(ParserMode::Response);
        let input = b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhelloHTTP/1.1 204 No Content\r\n\r\n";
        assert_eq!(parser.feed(input).unwrap(), input.len());
        assert_eq!(parser.next_message().unwrap().body().as_ref(), b"hello");
        let second = parser.next_message().unwrap();
        assert_eq!(second.status_code(), Some(204));
        assert_eq!(second.reason(), b"No Content");
    }

    #[test]
    fn chunked_response() {
        let input = crlf(indoc! {"
            HTTP/1.1 200 OK
            Transfer-Encoding: chunked

            4
            Wiki
            5
            pedia
            0

        "});
        let message = parse_one(ParserMode::Response, &input);
        assert_eq!(message.body().as_ref(), b"Wikipedia");
        assert!(message.is_chunked());
        assert_eq!(message.content_length(), None);
        assert!(message.should_keep_alive());
    }

    #[test]
    fn chunk_extensions_and_trailers() {
        let input = crlf(indoc! {"
            POST /upload HTTP/1.1
            Transfer-Encoding: chunked

            3;name=value
            abc
            A
            0123456789
            0
            Expires: never
            Content-Length: 100

        "});
        let message = parse_one(ParserMode::Request, &input);
        assert_eq!(message.body().as_ref(), b"abc0123456789");
        assert_eq!(message.trailers()["expires"], "never");
        // trailers never change framing and never leak into the headers
        assert_eq!(message.trailers()[CONTENT_LENGTH], "100");
        assert!(!message.headers().contains_key("expires"));
        assert_eq!(message.content_length(), None);
    }

    #[test]
    fn chunked_wins_over_content_length() {
        let input = b"POST / HTTP/1.1\r\nContent-Length: 100\r\nTransfer-Encoding: chunked\r\n\r\n2\r\nhi\r\n0\r\n\r\n";
        let message = parse_one(ParserMode::Request, input);
        assert_eq!(message.body().as_ref(), b"hi");
    }

    #[test]
    fn header_name_split_across_feeds() {
        let mut parser = Parser::new(ParserMode::Request);
        assert_eq!(parser.feed(b"GET / HTTP/1.1\r\nCon").unwrap(), 19);
        assert_eq!(parser.state(), ParseState::Headers(Headers::Field));
        assert_eq!(parser.feed(b"tent-Length: 5\r\n\r\nhello").unwrap(), 23);

        let message = parser.next_message().unwrap();
        assert_eq!(message.headers()[CONTENT_LENGTH], "5");
        assert_eq!(message.content_length(), Some(5));
        assert_eq!(message.body().as_ref(), b"hello");
    }

    #[test]
    fn http10_response_reads_until_eof() {
        let mut parser = Parser::new(ParserMode::Response);
        let input = b"HTTP/1.0 200 OK\r\n\r\nhello ";
        assert_eq!(parser.feed(input).unwrap(), input.len());
        assert_eq!(parser.state(), ParseState::Body(Body::IdentityEof));
        assert!(!parser.should_keep_alive());
        assert_eq!(parser.feed(b"world").unwrap(), 5);
        assert!(parser.next_message().is_none());

        parser.finish().unwrap();
        let message = parser.next_message().unwrap();
        assert_eq!(message.body().as_ref(), b"hello world");
        assert!(!message.should_keep_alive());
        assert_eq!(parser.state(), ParseState::Dead);

        let error = parser.feed(b"x").unwrap_err();
        assert_eq!(error.kind(), ParseErrorKind::ClosedConnection);
        assert_eq!(error.consumed(), 0);
    }

    #[test]
    fn header_overflow() {
        let config = ParserConfig::new().with_max_header_size(32);
        let mut parser = Parser::with_config(ParserMode::Request, config, ());
        let mut input = b"GET / HTTP/1.1\r\nX-Long: ".to_vec();
        input.extend_from_slice(&[b'a'; 100]);

        let error = parser.feed(&input).unwrap_err();
        assert_eq!(error.kind(), ParseErrorKind::HeaderOverflow);
        assert_eq!(error.consumed(), 32);
        assert!(!parser.message().headers_complete());

        let again = parser.feed(b"\r\n\r\n").unwrap_err();
        assert_eq!(again.kind(), ParseErrorKind::HeaderOverflow);
        assert_eq!(again.consumed(), 0);
    }

    #[test]
    fn header_limit_applies_per_message() {
        let config = ParserConfig::new().with_max_header_size(40);
        let mut parser = Parser::with_config(ParserMode::Request, config, ());
        let one = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";
        assert!(one.len() <= 40);
        let input = [one.as_slice(), one.as_slice(), one.as_slice()].concat();
        assert_eq!(parser.feed(&input).unwrap(), input.len());
        assert_eq!(parser.completed(), 3);
    }

    #[test]
    fn keep_alive_matrix() {
        let cases: [(&[u8], bool); 6] = [
            (b"GET / HTTP/1.1\r\n\r\n", true),
            (b"GET / HTTP/1.1\r\nConnection: close\r\n\r\n", false),
            (b"GET / HTTP/1.0\r\n\r\n", false),
            (b"GET / HTTP/1.0\r\nConnection: keep-alive\r\n\r\n", true),
            (b"GET / HTTP/1.0\r\nProxy-Connection: Keep-Alive\r\n\r\n", true),
            (b"GET / HTTP/1.1\r\nConnection: closed\r\n\r\n", true),
        ];
        for (input, keep_alive) in cases {
            let mut parser = Parser::new(ParserMode::Request);
            parser.feed(input).unwrap();
            let message = parser.next_message().unwrap();
            assert_eq!(message.should_keep_alive(), keep_alive, "{}", String::from_utf8_lossy(input));
            let expected = if keep_alive { ParseState::Start } else { ParseState::Dead };
            assert_eq!(parser.state(), expected);
        }
    }

    #[test]
    fn duplicate_headers_keep_first() {
        let message = parse_one(ParserMode::Request, b"GET / HTTP/1.1\r\nX: 1\r\nx: 2\r\n\r\n");
        assert_eq!(message.headers()["x"], "1");
        assert_eq!(message.headers().get_all("x").iter().count(), 1);
    }

    #[test]
    fn folded_and_empty_values() {
        let input = crlf(indoc! {"
            GET / HTTP/1.1
            X-Folded: first
              second
            X-Empty:
            X-Padded:   value\t
            Host: a

        "});
        let message = parse_one(ParserMode::Request, &input);
        assert_eq!(message.headers()["x-folded"], "first second");
        assert_eq!(message.headers()["x-empty"], "");
        assert_eq!(message.headers()["x-padded"], "value");
        assert_eq!(message.headers()[HOST], "a");
    }

    #[test]
    fn bare_lf_line_endings() {
        let message = parse_one(ParserMode::Request, b"GET / HTTP/1.1\nHost: a\n\n");
        assert_eq!(message.headers()[HOST], "a");
        let message = parse_one(ParserMode::Response, b"HTTP/1.1 304 Not Modified\n\n");
        assert_eq!(message.status_code(), Some(304));
    }

    #[test]
    fn status_line_without_reason() {
        let message = parse_one(ParserMode::Response, b"HTTP/1.1 204\r\n\r\n");
        assert_eq!(message.status_code(), Some(204));
        assert!(message.reason().is_empty());
    }

    #[test]
    fn pipelined_requests() {
        let input = crlf(indoc! {"
            POST /a HTTP/1.1
            Content-Length: 3

            abcGET /b HTTP/1.1

            GET /c HTTP/1.1

        "});
        let messages = parse_split(ParserMode::Request, &input, &[]);
        let paths: Vec<&[u8]> = messages.iter().map(Message::path).collect();
        assert_eq!(paths, [&b"/a"[..], &b"/b"[..], &b"/c"[..]]);
        assert_eq!(messages[0].body().as_ref(), b"abc");
        assert!(messages[1].body().is_empty());
    }

    #[test]
    fn leading_empty_lines_are_skipped() {
        let message = parse_one(ParserMode::Request, b"\r\n\r\nGET / HTTP/1.1\r\n\r\n");
        assert_eq!(message.path(), b"/");
    }

    #[test]
    fn trailing_empty_lines_after_close() {
        let mut parser = Parser::new(ParserMode::Request);
        let input = b"GET / HTTP/1.0\r\n\r\n\r\n";
        assert_eq!(parser.feed(input).unwrap(), input.len());
        assert_eq!(parser.state(), ParseState::Dead);
    }

    #[test]
    fn message_after_close_is_rejected() {
        let error = fail(ParserMode::Request, b"GET / HTTP/1.0\r\n\r\nGET / HTTP/1.0\r\n\r\n");
        assert_eq!(error.kind(), ParseErrorKind::ClosedConnection);
        assert_eq!(error.consumed(), 18);
    }

    #[test]
    fn pause_after_headers() {
        let config = ParserConfig::new().with_pause_after_headers(true);
        let mut parser = Parser::with_config(ParserMode::Request, config, ());
        let input = b"POST / HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";

        assert_eq!(parser.feed(input).unwrap(), 38);
        assert!(parser.is_paused());
        assert!(parser.message().headers_complete());
        assert_eq!(parser.message().method(), Some(Method::POST));
        assert!(parser.next_message().is_none());

        assert_eq!(parser.feed(&input[38..]).unwrap(), 0);
        parser.resume();
        assert_eq!(parser.feed(&input[38..]).unwrap(), 5);
        assert_eq!(parser.next_message().unwrap().body().as_ref(), b"hello");
    }

    #[test]
    fn eof_while_paused_completes_identity_body() {
        let config = ParserConfig::new().with_pause_after_headers(true);
        let mut parser = Parser::with_config(ParserMode::Response, config, ());
        let head = b"HTTP/1.0 200 OK\r\n\r\n";

        assert_eq!(parser.feed(head).unwrap(), head.len());
        assert!(parser.is_paused());
        assert_eq!(parser.state(), ParseState::Body(Body::IdentityEof));

        parser.finish().unwrap();
        let message = parser.next_message().unwrap();
        assert_eq!(message.status_code(), Some(200));
        assert!(message.body().is_empty());
        assert_eq!(parser.state(), ParseState::Dead);
    }

    #[test]
    fn eof_while_paused_inside_a_message_fails() {
        let mut parser = Parser::new(ParserMode::Request);
        parser.feed(b"GET / HTTP/1.1\r\nHo").unwrap();
        parser.pause();
        assert_eq!(parser.finish().unwrap_err().kind(), ParseErrorKind::InvalidEofState);
    }

    #[test]
    fn header_name_longer_than_header_name_limit() {
        let mut input = b"GET / HTTP/1.1\r\n".to_vec();
        input.extend_from_slice(&[b'a'; 70_000]);
        input.extend_from_slice(b": x\r\n\r\n");

        let error = fail(ParserMode::Request, &input);
        assert_eq!((error.kind(), error.consumed()), (ParseErrorKind::HeaderOverflow, 16 + 65_535));
    }

    #[test]
    fn caller_pause() {
        let mut parser = Parser::new(ParserMode::Request);
        parser.pause();
        assert_eq!(parser.feed(b"GET / HTTP/1.1\r\n\r\n").unwrap(), 0);
        parser.resume();
        assert_eq!(parser.feed(b"GET / HTTP/1.1\r\n\r\n").unwrap(), 18);
    }

    #[derive(Debug, Default)]
    struct Recorder {
        events: Vec<String>,
        abort_on_url: bool,
        pause_on_message_complete: bool,
    }

    impl Callbacks for Recorder {
        fn on_message_begin(&mut self) -> Action {
            self.events.push("begin".into());
            Action::Continue
        }

        fn on_url(&mut self, url: &[u8]) -> Action {
            self.events.push(format!("url {}", String::from_utf8_lossy(url)));
            if self.abort_on_url { Action::Abort } else { Action::Continue }
        }

        fn on_header_field(&mut self, field: &[u8]) -> Action {
            self.events.push(format!("field {}", String::from_utf8_lossy(field)));
            Action::Continue
        }

        fn on_header_value(&mut self, value: &[u8]) -> Action {
            self.events.push(format!("value {}", String::from_utf8_lossy(value)));
            Action::Continue
        }

        fn on_headers_complete(&mut self, head: &Head) -> Action {
            self.events.push(format!("headers keep_alive={} chunked={}", head.should_keep_alive, head.flags.chunked));
            Action::Continue
        }

        fn on_body(&mut self, body: &[u8]) -> Action {
            self.events.push(format!("body {}", String::from_utf8_lossy(body)));
            Action::Continue
        }

        fn on_chunk_header(&mut self, size: u64) -> Action {
            self.events.push(format!("chunk {size}"));
            Action::Continue
        }

        fn on_chunk_complete(&mut self) -> Action {
            self.events.push("chunk done".into());
            Action::Continue
        }

        fn on_message_complete(&mut self) -> Action {
            self.events.push("complete".into());
            if self.pause_on_message_complete { Action::Pause } else { Action::Continue }
        }
    }

    #[test]
    fn events_in_stream_order() {
        let input = b"PUT /x HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n4\r\nWiki\r\n0\r\n\r\n";
        let mut parser = Parser::with_hooks(ParserMode::Request, Recorder::default());
        assert_eq!(parser.feed(input).unwrap(), input.len());
        assert_eq!(
            parser.hooks().events,
            [
                "begin",
                "url /x",
                "field Transfer-Encoding",
                "value chunked",
                "headers keep_alive=true chunked=true",
                "chunk 4",
                "body Wiki",
                "chunk done",
                "chunk 0",
                "chunk done",
                "complete",
            ]
        );
    }

    #[test]
    fn hook_pause_stops_between_pipelined_messages() {
        let hooks = Recorder { pause_on_message_complete: true, ..Recorder::default() };
        let mut parser = Parser::with_hooks(ParserMode::Request, hooks);
        let input = b"GET /a HTTP/1.1\r\n\r\nGET /b HTTP/1.1\r\n\r\n";

        assert_eq!(parser.feed(input).unwrap(), 19);
        assert_eq!(parser.completed(), 1);
        parser.resume();
        assert_eq!(parser.feed(&input[19..]).unwrap(), 19);
        assert_eq!(parser.completed(), 2);
    }

    #[test]
    fn hook_abort() {
        let hooks = Recorder { abort_on_url: true, ..Recorder::default() };
        let mut parser = Parser::with_hooks(ParserMode::Request, hooks);
        let error = parser.feed(b"GET /x HTTP/1.1\r\n\r\n").unwrap_err();
        assert_eq!(error.kind(), ParseErrorKind::CallbackAborted);
        assert_eq!(error.consumed(), 6);

        let again = parser.feed(b"GET / HTTP/1.1\r\n\r\n").unwrap_err();
        assert_eq!(again.kind(), ParseErrorKind::CallbackAborted);
        assert_eq!(again.consumed(), 0);

        parser.reset();
        parser.hooks_mut().abort_on_url = false;
        assert_eq!(parser.feed(b"GET / HTTP/1.1\r\n\r\n").unwrap(), 18);
    }

    #[test]
    fn eof_handling() {
        let mut parser = Parser::new(ParserMode::Request);
        parser.finish().unwrap();
        assert_eq!(parser.feed(b"GET / HTTP/1.1\r\nHost").unwrap(), 20);
        let error = parser.finish().unwrap_err();
        assert_eq!(error.kind(), ParseErrorKind::InvalidEofState);

        let mut parser = Parser::new(ParserMode::Response);
        parser.feed(b"HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\nabc").unwrap();
        assert_eq!(parser.finish().unwrap_err().kind(), ParseErrorKind::InvalidEofState);
    }

    #[test]
    fn upgrade_stops_at_end_of_headers() {
        let head = crlf(indoc! {"
            GET /chat HTTP/1.1
            Host: example.com
            Upgrade: websocket
            Connection: Upgrade

        "});
        let mut input = head.clone();
        input.extend_from_slice(b"\x81\x05hello");

        let mut parser = Parser::new(ParserMode::Request);
        assert_eq!(parser.feed(&input).unwrap(), head.len());
        assert!(parser.is_upgrade());
        assert_eq!(parser.state(), ParseState::MessageDone);

        let message = parser.next_message().unwrap();
        assert!(message.is_upgrade());
        assert!(message.body().is_empty());

        assert_eq!(parser.feed(b"more frames").unwrap(), 0);
        parser.finish().unwrap();
    }

    #[test]
    fn connect_is_an_upgrade() {
        let head = b"CONNECT example.com:443 HTTP/1.1\r\nHost: example.com:443\r\n\r\n";
        let mut input = head.to_vec();
        input.extend_from_slice(b"\x16\x03\x01");

        let mut parser = Parser::new(ParserMode::Request);
        assert_eq!(parser.feed(&input).unwrap(), head.len());
        let message = parser.next_message().unwrap();
        assert_eq!(message.method(), Some(Method::CONNECT));
        assert_eq!(message.raw_url(), b"example.com:443");
        let url = message.url().unwrap();
        assert_eq!(url.host, Some(&b"example.com"[..]));
        assert_eq!(url.port, Some(443));
    }

    #[test]
    fn skip_body_for_head_response() {
        let mut parser = Parser::new(ParserMode::Response);
        parser.set_skip_body(true);
        let input = b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nHTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok";
        assert_eq!(parser.feed(input).unwrap(), input.len());

        let head = parser.next_message().unwrap();
        assert_eq!(head.content_length(), Some(5));
        assert!(head.body().is_empty());
        assert!(head.should_keep_alive());
        assert!(!parser.flags().skip_body);

        assert_eq!(parser.next_message().unwrap().body().as_ref(), b"ok");
    }

    #[test]
    fn bodyless_statuses_do_not_wait_for_eof() {
        for status in [b"100", b"204", b"304"] {
            let input = [b"HTTP/1.1 ".as_slice(), status.as_slice(), b" X\r\n\r\n".as_slice()].concat();
            let message = parse_one(ParserMode::Response, &input);
            assert!(message.should_keep_alive());
        }
    }

    #[test]
    fn every_method_parses() {
        for method in Method::ALL {
            let input = format!("{method} / HTTP/1.1\r\n\r\n");
            let mut parser = Parser::new(ParserMode::Request);
            assert_eq!(parser.feed(input.as_bytes()).unwrap(), input.len(), "{method}");
            assert_eq!(parser.next_message().unwrap().method(), Some(method));
        }
    }

    #[test]
    fn absolute_form_target() {
        let message = parse_one(ParserMode::Request, b"GET http://user@example.com:8080/p?q=1#f HTTP/1.1\r\n\r\n");
        let url = message.url().unwrap();
        assert_eq!(url.schema, Some(&b"http"[..]));
        assert_eq!(url.userinfo, Some(&b"user"[..]));
        assert_eq!(url.host, Some(&b"example.com"[..]));
        assert_eq!(url.port, Some(8080));
        assert_eq!(url.path, Some(&b"/p"[..]));
        assert_eq!(url.query, Some(&b"q=1"[..]));
        assert_eq!(url.fragment, Some(&b"f"[..]));
    }

    #[test]
    fn error_offsets() {
        use ParseErrorKind::{
            InvalidChunkSize, InvalidConstant, InvalidContentLength, InvalidHeaderToken, InvalidMethod, InvalidStatus, InvalidUrl,
            InvalidVersion, LfExpected, UnexpectedContentLength,
        };

        let cases: [(ParserMode, &[u8], ParseErrorKind, usize); 16] = [
            (ParserMode::Request, b"get / HTTP/1.1\r\n\r\n", InvalidMethod, 0),
            (ParserMode::Request, b"GETS / HTTP/1.1\r\n\r\n", InvalidMethod, 3),
            (ParserMode::Request, b"GET /a\x01b HTTP/1.1\r\n\r\n", InvalidUrl, 6),
            (ParserMode::Request, b"GET /a\r\n\r\n", InvalidUrl, 6),
            (ParserMode::Request, b"GET / HTXP/1.1\r\n\r\n", InvalidConstant, 8),
            (ParserMode::Request, b"GET / HTTP/1000.1\r\n\r\n", InvalidVersion, 14),
            (ParserMode::Request, b"GET / HTTP/1.1\rX", LfExpected, 15),
            (ParserMode::Request, b"GET / HTTP/1.1\r\nBad Header: x\r\n\r\n", InvalidHeaderToken, 19),
            (ParserMode::Request, b"GET / HTTP/1.1\r\nX: a\x01b\r\n\r\n", InvalidHeaderToken, 20),
            (ParserMode::Request, b"POST / HTTP/1.1\r\nContent-Length: abc\r\n\r\n", InvalidContentLength, 33),
            (ParserMode::Request, b"POST / HTTP/1.1\r\nContent-Length:\r\n\r\n", InvalidContentLength, 34),
            (ParserMode::Request, b"POST / HTTP/1.1\r\nContent-Length: 1\r\nContent-Length: 1\r\n\r\n", UnexpectedContentLength, 50),
            (ParserMode::Response, b"HTTP/1.1 20 OK\r\n\r\n", InvalidStatus, 11),
            (ParserMode::Response, b"HTTP/1.1 2000 OK\r\n\r\n", InvalidStatus, 12),
            (ParserMode::Response, b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\nzz\r\n", InvalidChunkSize, 47),
            (ParserMode::Response, b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n2;x\nab\r\n", InvalidChunkSize, 50),
        ];
        for (mode, input, kind, consumed) in cases {
            let error = fail(mode, input);
            assert_eq!((error.kind(), error.consumed()), (kind, consumed), "{}", String::from_utf8_lossy(input));
        }
    }

    #[test]
    fn response_must_start_with_http() {
        let error = fail(ParserMode::Response, b"HTTX/1.1 200 OK\r\n\r\n");
        assert_eq!((error.kind(), error.consumed()), (ParseErrorKind::InvalidConstant, 3));
    }

    #[test]
    fn folded_content_length_cannot_add_digits() {
        let error = fail(ParserMode::Request, b"POST / HTTP/1.1\r\nContent-Length: 1\r\n 2\r\n\r\n");
        assert_eq!(error.kind(), ParseErrorKind::InvalidContentLength);
    }

    #[test]
    fn chunk_size_overflow() {
        let error = fail(ParserMode::Response, b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\nFFFFFFFFFFFFFFFFF\r\n");
        assert_eq!(error.kind(), ParseErrorKind::InvalidChunkSize);
    }

    #[test]
    fn reset_keeps_mode_and_clears_queue() {
        let mut parser = Parser::new(ParserMode::Response);
        parser.feed(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n").unwrap();
        assert_eq!(parser.completed(), 1);
        parser.reset();
        assert_eq!(parser.completed(), 0);
        assert_eq!(parser.mode(), ParserMode::Response);
        assert_eq!(parser.state(), ParseState::Start);
    }

    const FIXTURES: [(ParserMode, &[u8]); 5] = [
        (ParserMode::Request, b"GET /index.html?x=1 HTTP/1.1\r\nHost: example.com\r\nConnection: keep-alive\r\n\r\n"),
        (ParserMode::Request, b"POST /form HTTP/1.1\r\nContent-Length: 11\r\nX-Folded: a\r\n  b\r\n\r\nhello worldGET /next HTTP/1.1\r\n\r\n"),
        (ParserMode::Request, b"PUT /up HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n4;x=y\r\nWiki\r\n5\r\npedia\r\n0\r\nTrailer: t\r\n\r\n"),
        (ParserMode::Response, b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhelloHTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n"),
        (ParserMode::Response, b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n4\r\nWiki\r\n5\r\npedia\r\n0\r\n\r\n"),
    ];

    #[test]
    fn byte_at_a_time() {
        for (mode, input) in FIXTURES {
            let whole = parse_split(mode, input, &[]);
            let splits: Vec<usize> = (1..input.len()).collect();
            assert_eq!(parse_split(mode, input, &splits), whole);
        }
    }

    proptest! {
        #[test]
        fn split_invariance(index in 0..FIXTURES.len(), mut splits in proptest::collection::vec(0usize..200, 0..8)) {
            let (mode, input) = FIXTURES[index];
            splits.sort_unstable();
            let whole = parse_split(mode, input, &[]);
            prop_assert!(!whole.is_empty());
            prop_assert_eq!(parse_split(mode, input, &splits), whole);
        }

        #[test]
        fn chunked_body_round_trip(
            body in proptest::collection::vec(any::<u8>(), 0..512),
            sizes in proptest::collection::vec(1usize..64, 1..16),
            split in 0usize..1024,
        ) {
            let mut wire = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n".to_vec();
            let mut rest = body.as_slice();
            let mut sizes = sizes.iter().cycle();
            while !rest.is_empty() {
                let n = sizes.next().map_or(rest.len(), |&size| size.min(rest.len()));
                wire.extend_from_slice(format!("{n:x}\r\n").as_bytes());
                wire.extend_from_slice(&rest[..n]);
                wire.extend_from_slice(b"\r\n");
                rest = &rest[n..];
            }
            wire.extend_from_slice(b"0\r\n\r\n");

            let messages = parse_split(ParserMode::Response, &wire, &[split]);
            prop_assert_eq!(messages.len(), 1);
            prop_assert_eq!(messages[0].body().as_ref(), body.as_slice());
        }
    }
}
