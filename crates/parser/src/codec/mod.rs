//! Codec adapters connecting the parser to `tokio_util` framed transports.
//!
//! - [`MessageDecoder`]: a [`Decoder`](tokio_util::codec::Decoder) that turns a read buffer
//!   into complete [`Message`](crate::protocol::Message)s, one per `decode` call

mod message_decoder;

pub use message_decoder::MessageDecoder;
