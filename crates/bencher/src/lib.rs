//! Fixtures shared by the parser benchmarks.
//!
//! Fixture files are stored with LF line endings so they stay readable; [`Fixture::wire`] turns
//! them into what a peer actually sends.

use micro_http_parser::protocol::ParserMode;

#[derive(Debug, Copy, Clone)]
pub struct Fixture {
    name: &'static str,
    mode: ParserMode,
    content: &'static str,
}

impl Fixture {
    pub const fn new(name: &'static str, mode: ParserMode, content: &'static str) -> Self {
        Self { name, mode, content }
    }

    pub const fn request(name: &'static str, content: &'static str) -> Self {
        Self::new(name, ParserMode::Request, content)
    }

    pub const fn response(name: &'static str, content: &'static str) -> Self {
        Self::new(name, ParserMode::Response, content)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn mode(&self) -> ParserMode {
        self.mode
    }

    /// The fixture with CRLF line endings.
    pub fn wire(&self) -> Vec<u8> {
        self.content.replace('\n', "\r\n").into_bytes()
    }
}

/// How a benchmark hands a fixture to the parser.
#[derive(Clone, Copy, Debug)]
pub enum Feeding {
    /// The whole message in one call.
    Whole,
    /// Pieces of at most this many bytes, as a slow socket delivers them.
    Pieces(usize),
}

impl Feeding {
    pub fn label(&self) -> String {
        match self {
            Feeding::Whole => "whole".to_owned(),
            Feeding::Pieces(size) => format!("pieces_{size}"),
        }
    }

    /// Splits `input` the way this feeding delivers it.
    pub fn split<'a>(&self, input: &'a [u8]) -> Vec<&'a [u8]> {
        match *self {
            Feeding::Whole => vec![input],
            Feeding::Pieces(size) => input.chunks(size.max(1)).collect(),
        }
    }
}
