//! An incremental, byte-at-a-time HTTP/1.x message parser
//!
//! This crate frames HTTP/1.0 and HTTP/1.1 requests and responses out of a byte stream that
//! arrives in arbitrary pieces. It is the layer a server or client puts between its socket and
//! its application: bytes go in, complete messages (or a stream of parse events) come out.
//!
//! # Features
//!
//! - Input split at any byte boundary, down to one byte per call
//! - Request lines, status lines, header blocks with obsolete line folding
//! - Content-Length, chunked (with extensions and trailers) and read-until-close bodies
//! - Keep-alive, pipelining, `Upgrade` and `CONNECT`
//! - A header size limit enforced while the header block streams in
//! - No allocation inside the state machine; fragments are copied only by the message assembler
//! - Pause, resume and abort from the caller or from event hooks
//!
//! # Example
//!
//! ```
//! use micro_http_parser::parser::Parser;
//! use micro_http_parser::protocol::ParserMode;
//!
//! let mut parser = Parser::new(ParserMode::Response);
//!
//! // the transport may deliver the message in any number of pieces
//! parser.feed(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chu").unwrap();
//! parser.feed(b"nked\r\n\r\n4\r\nWiki\r\n5\r\npedia\r\n0\r\n\r\n").unwrap();
//!
//! let message = parser.next_message().unwrap();
//! assert_eq!(message.status_code(), Some(200));
//! assert_eq!(message.body().as_ref(), b"Wikipedia");
//! assert!(message.should_keep_alive());
//! ```
//!
//! # Architecture
//!
//! The crate is organized into three modules:
//!
//! - [`parser`]: the state machine and the [`Parser`](parser::Parser) that assembles messages
//! - [`protocol`]: the [`Message`](protocol::Message), method and error types
//! - [`codec`]: a `tokio_util` [`Decoder`](tokio_util::codec::Decoder) over the parser
//!
//! ## Event hooks
//!
//! A type implementing [`parser::Callbacks`] sees every parse event in stream order (URL and
//! header fragments, headers complete, body pieces, chunk boundaries). Each hook answers with
//! an [`Action`](parser::Action): continue, pause or abort.
//!
//! ## Error Handling
//!
//! Every error is fatal for the parser that raised it:
//!
//! - [`protocol::ParseErrorKind`]: what was wrong with the input
//! - [`protocol::ParseError`]: the kind plus the offset of the rejected byte
//! - [`protocol::DecodeError`]: the codec error, a parse or an I/O failure
//!
//! # Limitations
//!
//! - HTTP/1.x framing only: no HTTP/2, no TLS, no content decoding
//! - Maximum header size: 80KB by default, see [`parser::ParserConfig`]

pub mod codec;
pub mod parser;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
