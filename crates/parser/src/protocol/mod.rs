//! Protocol-level types shared by the parser and the codec.
//!
//! - [`Message`]: an owned, fully parsed request or response
//! - [`Method`]: the fixed table of request methods the request line accepts
//! - [`ParseErrorKind`] / [`ParseError`]: why and where a byte stream was rejected
//! - [`DecodeError`]: the error of the [`MessageDecoder`](crate::codec::MessageDecoder) codec

mod error;
pub use error::DecodeError;
pub use error::ParseError;
pub use error::ParseErrorKind;

mod message;
pub use message::Message;
pub use message::ParserMode;

mod method;
pub use method::Method;
