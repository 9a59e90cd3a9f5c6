//! Framing of a byte stream into [`Message`]s for `tokio_util`'s `FramedRead`.
//!
//! # Example
//!
//! ```no_run
//! use futures::StreamExt;
//! use micro_http_parser::codec::MessageDecoder;
//! use tokio_util::codec::FramedRead;
//!
//! # async fn run(stream: tokio::net::TcpStream) {
//! let mut framed = FramedRead::new(stream, MessageDecoder::request());
//! while let Some(Ok(message)) = framed.next().await {
//!     println!("{:?} {:?}", message.method(), message.raw_url());
//! }
//! # }
//! ```

use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::parser::{Callbacks, Parser, ParserConfig};
use crate::protocol::{DecodeError, Message, ParserMode};

/// A [`Decoder`] yielding one complete [`Message`] at a time.
///
/// The read buffer is advanced by exactly the bytes the parser consumed. After an upgrade the
/// bytes of the new protocol stay in the buffer, untouched.
#[derive(Debug)]
pub struct MessageDecoder<H: Callbacks = ()> {
    parser: Parser<H>,
}

impl MessageDecoder<()> {
    pub fn new(mode: ParserMode) -> Self {
        Self { parser: Parser::new(mode) }
    }

    /// Decodes requests, as a server reads them.
    pub fn request() -> Self {
        Self::new(ParserMode::Request)
    }

    /// Decodes responses, as a client reads them.
    pub fn response() -> Self {
        Self::new(ParserMode::Response)
    }
}

impl<H: Callbacks> MessageDecoder<H> {
    pub fn with_config(mode: ParserMode, config: ParserConfig, hooks: H) -> Self {
        Self { parser: Parser::with_config(mode, config, hooks) }
    }

    pub fn parser(&self) -> &Parser<H> {
        &self.parser
    }

    /// Access to the parser, e.g. to [`set_skip_body`](Parser::set_skip_body) before reading the
    /// response to a HEAD request.
    pub fn parser_mut(&mut self) -> &mut Parser<H> {
        &mut self.parser
    }

    pub fn into_parser(self) -> Parser<H> {
        self.parser
    }
}

impl<H: Callbacks> Decoder for MessageDecoder<H> {
    type Item = Message;
    type Error = DecodeError;

    /// Parses the buffered bytes and returns the oldest completed message.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(message))`: a message is complete
    /// - `Ok(None)`: more data is needed, or the parser is paused or upgraded
    /// - `Err(_)`: the stream is not valid HTTP
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // messages pipelined in an earlier read come first
        if let Some(message) = self.parser.next_message() {
            return Ok(Some(message));
        }
        if src.is_empty() {
            return Ok(None);
        }

        let consumed = self.parser.feed(src)?;
        src.advance(consumed);
        trace!(consumed, remaining = src.len(), "decoded bytes");

        Ok(self.parser.next_message())
    }

    /// Like [`decode`](Decoder::decode), then tells the parser the stream ended so a response
    /// delimited by the connection closing completes.
    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(message) = self.decode(buf)? {
            return Ok(Some(message));
        }
        self.parser.finish()?;
        Ok(self.parser.next_message())
    }
}
