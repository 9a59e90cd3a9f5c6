//! Event hooks invoked by the state machine.
//!
//! Data callbacks receive sub-slices of the buffer passed to `feed`. A field that spans several
//! `feed` calls is reported as several consecutive fragments; implementations that need the
//! whole value must copy and concatenate them.

use crate::parser::Flags;
use crate::protocol::{Method, ParserMode};

/// What the parser should do after a callback returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    #[default]
    Continue,
    /// Stop after the current byte. `feed` returns the bytes consumed so far and the parser
    /// stays paused until [`Parser::resume`](crate::parser::Parser::resume).
    Pause,
    /// Fail with [`ParseErrorKind::CallbackAborted`](crate::protocol::ParseErrorKind::CallbackAborted).
    Abort,
}

impl Action {
    /// Combines the answers of two hooks for the same event. The stronger one wins.
    #[must_use]
    pub(crate) fn merge(self, other: Action) -> Action {
        match (self, other) {
            (Action::Abort, _) | (_, Action::Abort) => Action::Abort,
            (Action::Pause, _) | (_, Action::Pause) => Action::Pause,
            _ => Action::Continue,
        }
    }
}

/// Snapshot of a message head, handed to [`Callbacks::on_headers_complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Head {
    pub mode: ParserMode,
    pub method: Option<Method>,
    pub status_code: Option<u16>,
    pub http_major: u16,
    pub http_minor: u16,
    pub flags: Flags,
    pub content_length: Option<u64>,
    pub should_keep_alive: bool,
    pub upgrade: bool,
}

/// Receives parse events in byte-stream order.
///
/// Every method defaults to [`Action::Continue`], so implementors only override the events
/// they are interested in. `()` is the empty hook set.
#[allow(unused_variables, reason = "default implementations ignore their arguments")]
pub trait Callbacks {
    fn on_message_begin(&mut self) -> Action {
        Action::Continue
    }

    fn on_url(&mut self, url: &[u8]) -> Action {
        Action::Continue
    }

    /// Reason phrase of a response.
    fn on_status(&mut self, reason: &[u8]) -> Action {
        Action::Continue
    }

    fn on_header_field(&mut self, field: &[u8]) -> Action {
        Action::Continue
    }

    fn on_header_value(&mut self, value: &[u8]) -> Action {
        Action::Continue
    }

    fn on_headers_complete(&mut self, head: &Head) -> Action {
        Action::Continue
    }

    fn on_body(&mut self, body: &[u8]) -> Action {
        Action::Continue
    }

    fn on_chunk_header(&mut self, size: u64) -> Action {
        Action::Continue
    }

    fn on_chunk_complete(&mut self) -> Action {
        Action::Continue
    }

    fn on_message_complete(&mut self) -> Action {
        Action::Continue
    }
}

impl Callbacks for () {}

impl<C: Callbacks + ?Sized> Callbacks for Box<C> {
    fn on_message_begin(&mut self) -> Action {
        (**self).on_message_begin()
    }

    fn on_url(&mut self, url: &[u8]) -> Action {
        (**self).on_url(url)
    }

    fn on_status(&mut self, reason: &[u8]) -> Action {
        (**self).on_status(reason)
    }

    fn on_header_field(&mut self, field: &[u8]) -> Action {
        (**self).on_header_field(field)
    }

    fn on_header_value(&mut self, value: &[u8]) -> Action {
        (**self).on_header_value(value)
    }

    fn on_headers_complete(&mut self, head: &Head) -> Action {
        (**self).on_headers_complete(head)
    }

    fn on_body(&mut self, body: &[u8]) -> Action {
        (**self).on_body(body)
    }

    fn on_chunk_header(&mut self, size: u64) -> Action {
        (**self).on_chunk_header(size)
    }

    fn on_chunk_complete(&mut self) -> Action {
        (**self).on_chunk_complete()
    }

    fn on_message_complete(&mut self) -> Action {
        (**self).on_message_complete()
    }
}
