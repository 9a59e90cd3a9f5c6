//! Incremental HTTP/1.x message parsing.
//!
//! The parser is layered, leaves first:
//!
//! - `chars`: compile-time byte classification tables
//! - `url`: the request-target automaton ([`classify`]), plus [`parse_url`] / [`parse_host`]
//!   for decomposing a complete target
//! - [`HeaderMatch`]: streaming recognition of the header names that affect framing
//! - `machine`: the per-byte message automaton, reporting events through [`Callbacks`]
//! - [`Parser`]: owns a machine, assembles owned [`Message`](crate::protocol::Message)s and
//!   queues them for the caller
//!
//! Input may be split at any byte: feeding a message in one call or one byte at a time yields
//! the same messages and the same events.

mod callbacks;
mod chars;
mod header_match;
mod machine;
mod message_parser;
mod state;
mod url;

pub use callbacks::{Action, Callbacks, Head};
pub use header_match::{HeaderMatch, KnownHeader};
pub use machine::{DEFAULT_MAX_HEADER_SIZE, Flags};
pub use message_parser::{Parser, ParserConfig};
pub use state::{Body, Chunked, Headers, ParseState, RequestLine, StatusLine};
pub use url::{Host, Url, UrlState, classify, parse_host, parse_url};
