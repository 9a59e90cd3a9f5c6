//! Request-target classification and decomposition.
//!
//! [`classify`] is the per-byte automaton the request-line states delegate to while the
//! target streams in. [`parse_url`] and [`parse_host`] walk an already delimited target
//! afterwards to split it into its components.

use crate::ensure;
use crate::parser::chars::{is_hex, is_host_char, is_url_char, is_userinfo_char};
use crate::protocol::ParseError;

/// Position inside a request target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlState {
    /// Invalid byte for the current position.
    Dead,
    SpacesBeforeUrl,
    Schema,
    SchemaSlash,
    SchemaSlashSlash,
    ServerStart,
    Server,
    ServerWithAt,
    Path,
    QueryStringStart,
    QueryString,
    FragmentStart,
    Fragment,
}

impl UrlState {
    /// Initial state for a target: CONNECT carries `host:port`, not a URL.
    #[inline]
    pub fn initial(is_connect: bool) -> Self {
        if is_connect { UrlState::ServerStart } else { UrlState::SpacesBeforeUrl }
    }

    /// Whether a complete target may end in this state.
    ///
    /// A target cut off inside the scheme or right after `scheme:` is incomplete.
    #[inline]
    pub fn can_end(self) -> bool {
        !matches!(
            self,
            UrlState::Dead | UrlState::SpacesBeforeUrl | UrlState::Schema | UrlState::SchemaSlash | UrlState::SchemaSlashSlash | UrlState::ServerStart
        )
    }
}

/// Advances the target automaton by one byte.
///
/// Pure: the returned state only depends on `state` and `byte`. SP, CR and LF never belong to
/// a target and always yield [`UrlState::Dead`]; the request-line states intercept them first.
pub fn classify(state: UrlState, byte: u8) -> UrlState {
    if matches!(byte, b' ' | b'\r' | b'\n' | b'\t' | 0x0C) {
        return UrlState::Dead;
    }

    match state {
        UrlState::SpacesBeforeUrl => {
            if byte == b'/' || byte == b'*' {
                return UrlState::Path;
            }
            if byte.is_ascii_alphabetic() {
                return UrlState::Schema;
            }
        }

        UrlState::Schema => {
            if byte.is_ascii_alphabetic() {
                return state;
            }
            if byte == b':' {
                return UrlState::SchemaSlash;
            }
        }

        UrlState::SchemaSlash => {
            if byte == b'/' {
                return UrlState::SchemaSlashSlash;
            }
        }

        UrlState::SchemaSlashSlash => {
            if byte == b'/' {
                return UrlState::ServerStart;
            }
        }

        UrlState::ServerStart | UrlState::Server | UrlState::ServerWithAt => {
            // once an '@' was seen the rest of the authority stays in ServerWithAt
            let server = if state == UrlState::ServerWithAt { state } else { UrlState::Server };
            match byte {
                b'/' => return UrlState::Path,
                b'?' => return UrlState::QueryStringStart,
                b'@' if state == UrlState::ServerWithAt => return UrlState::Dead,
                b'@' => return UrlState::ServerWithAt,
                b'[' | b']' => return server,
                b if is_userinfo_char(b) => return server,
                _ => {}
            }
        }

        UrlState::Path => {
            if is_url_char(byte) {
                return state;
            }
            match byte {
                b'?' => return UrlState::QueryStringStart,
                b'#' => return UrlState::FragmentStart,
                _ => {}
            }
        }

        UrlState::QueryStringStart | UrlState::QueryString => {
            if is_url_char(byte) || byte == b'?' {
                return UrlState::QueryString;
            }
            if byte == b'#' {
                return UrlState::FragmentStart;
            }
        }

        UrlState::FragmentStart => {
            if is_url_char(byte) || byte == b'?' {
                return UrlState::Fragment;
            }
            if byte == b'#' {
                return state;
            }
        }

        UrlState::Fragment => {
            if is_url_char(byte) || byte == b'?' || byte == b'#' {
                return state;
            }
        }

        UrlState::Dead => {}
    }

    UrlState::Dead
}

/// Components of a request target, borrowed from the buffer it was parsed from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Url<'a> {
    pub schema: Option<&'a [u8]>,
    pub userinfo: Option<&'a [u8]>,
    pub host: Option<&'a [u8]>,
    pub port: Option<u16>,
    pub path: Option<&'a [u8]>,
    pub query: Option<&'a [u8]>,
    pub fragment: Option<&'a [u8]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Schema,
    Host,
    Path,
    Query,
    Fragment,
}

/// Splits a complete request target into its components.
///
/// `is_connect` selects the CONNECT form, which must be exactly `host:port`.
pub fn parse_url(buf: &[u8], is_connect: bool) -> Result<Url<'_>, ParseError> {
    ensure!(!buf.is_empty(), ParseError::invalid_url(0));

    let mut url = Url::default();
    let mut state = UrlState::initial(is_connect);
    let mut current: Option<(Field, usize)> = None;
    let mut found_at = false;
    let mut authority = None;

    for (i, &byte) in buf.iter().enumerate() {
        state = classify(state, byte);

        let field = match state {
            UrlState::Dead => return Err(ParseError::invalid_url(i)),
            // delimiters
            UrlState::SpacesBeforeUrl
            | UrlState::SchemaSlash
            | UrlState::SchemaSlashSlash
            | UrlState::ServerStart
            | UrlState::QueryStringStart
            | UrlState::FragmentStart => {
                close_field(&mut url, &mut authority, buf, current.take(), i);
                continue;
            }
            UrlState::Schema => Field::Schema,
            UrlState::ServerWithAt => {
                found_at = true;
                Field::Host
            }
            UrlState::Server => Field::Host,
            UrlState::Path => Field::Path,
            UrlState::QueryString => Field::Query,
            UrlState::Fragment => Field::Fragment,
        };

        match current {
            Some((open, _)) if open == field => {}
            _ => {
                close_field(&mut url, &mut authority, buf, current.take(), i);
                current = Some((field, i));
            }
        }
    }
    close_field(&mut url, &mut authority, buf, current.take(), buf.len());

    // "http:///toto" has a schema but no host
    ensure!(url.schema.is_none() || authority.is_some(), ParseError::invalid_url(buf.len()));

    if let Some((start, end)) = authority {
        let host = parse_host(&buf[start..end], found_at).map_err(|e| ParseError::invalid_url(start + e.consumed()))?;
        url.userinfo = host.userinfo;
        url.host = Some(host.host);
        url.port = host.port;
    }

    if is_connect {
        let only_authority = url.schema.is_none() && url.path.is_none() && url.query.is_none() && url.fragment.is_none();
        ensure!(only_authority && url.host.is_some() && url.port.is_some(), ParseError::invalid_url(buf.len()));
    }

    Ok(url)
}

fn close_field<'a>(url: &mut Url<'a>, authority: &mut Option<(usize, usize)>, buf: &'a [u8], open: Option<(Field, usize)>, end: usize) {
    let Some((field, start)) = open else {
        return;
    };
    let bytes = &buf[start..end];
    match field {
        Field::Schema => url.schema = Some(bytes),
        Field::Host => *authority = Some((start, end)),
        Field::Path => url.path = Some(bytes),
        Field::Query => url.query = Some(bytes),
        Field::Fragment => url.fragment = Some(bytes),
    }
}

/// Result of [`parse_host`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Host<'a> {
    pub userinfo: Option<&'a [u8]>,
    /// The host without brackets; an IPv6 literal keeps its zone id.
    pub host: &'a [u8],
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostState {
    Dead,
    UserinfoStart,
    Userinfo,
    HostStart,
    HostV6Start,
    HostV6,
    HostV6End,
    HostV6ZoneStart,
    HostV6Zone,
    PortStart,
    Host,
    Port,
}

fn host_char(state: HostState, byte: u8) -> HostState {
    match state {
        HostState::UserinfoStart | HostState::Userinfo => {
            if byte == b'@' {
                return HostState::HostStart;
            }
            if is_userinfo_char(byte) {
                return HostState::Userinfo;
            }
        }

        HostState::HostStart => {
            if byte == b'[' {
                return HostState::HostV6Start;
            }
            if is_host_char(byte) {
                return HostState::Host;
            }
        }

        HostState::Host | HostState::HostV6End => {
            if state == HostState::Host && is_host_char(byte) {
                return HostState::Host;
            }
            if byte == b':' {
                return HostState::PortStart;
            }
        }

        HostState::HostV6Start | HostState::HostV6 => {
            if state == HostState::HostV6 && byte == b']' {
                return HostState::HostV6End;
            }
            if is_hex(byte) || byte == b':' || byte == b'.' {
                return HostState::HostV6;
            }
            if state == HostState::HostV6 && byte == b'%' {
                return HostState::HostV6ZoneStart;
            }
        }

        HostState::HostV6ZoneStart | HostState::HostV6Zone => {
            if state == HostState::HostV6Zone && byte == b']' {
                return HostState::HostV6End;
            }
            // RFC 6874: 1*( unreserved / pct-encoded )
            if byte.is_ascii_alphanumeric() || matches!(byte, b'%' | b'.' | b'-' | b'_' | b'~') {
                return HostState::HostV6Zone;
            }
        }

        HostState::PortStart | HostState::Port => {
            if byte.is_ascii_digit() {
                return HostState::Port;
            }
        }

        HostState::Dead => {}
    }

    HostState::Dead
}

/// Splits an authority (`[userinfo@]host[:port]`) into its parts.
///
/// `had_authority_at` tells whether the target automaton saw an `@`, i.e. whether the
/// authority starts with userinfo. Brackets around an IPv6 literal are stripped, and the
/// `:` inside them never starts a port.
pub fn parse_host(buf: &[u8], had_authority_at: bool) -> Result<Host<'_>, ParseError> {
    let mut state = if had_authority_at { HostState::UserinfoStart } else { HostState::HostStart };
    let mut userinfo: Option<(usize, usize)> = None;
    let mut host: Option<(usize, usize)> = None;
    let mut port: Option<(usize, usize)> = None;

    for (i, &byte) in buf.iter().enumerate() {
        let next = host_char(state, byte);
        match next {
            HostState::Dead => return Err(ParseError::invalid_url(i)),
            HostState::Host | HostState::HostV6 | HostState::HostV6ZoneStart | HostState::HostV6Zone => extend(&mut host, i),
            HostState::Port => extend(&mut port, i),
            HostState::Userinfo => extend(&mut userinfo, i),
            _ => {}
        }
        state = next;
    }

    // make sure we don't end somewhere unexpected
    ensure!(matches!(state, HostState::Host | HostState::HostV6End | HostState::Port), ParseError::invalid_url(buf.len()));

    let port = match port {
        Some((start, end)) => Some(parse_port(&buf[start..end]).ok_or_else(|| ParseError::invalid_url(start))?),
        None => None,
    };
    let (host_start, host_end) = host.ok_or_else(|| ParseError::invalid_url(buf.len()))?;

    Ok(Host { userinfo: userinfo.map(|(start, end)| &buf[start..end]), host: &buf[host_start..host_end], port })
}

/// Grows a contiguous `(start, end)` span to cover byte `i`.
#[inline]
fn extend(span: &mut Option<(usize, usize)>, i: usize) {
    match span {
        Some((_, end)) => *end = i + 1,
        None => *span = Some((i, i + 1)),
    }
}

fn parse_port(digits: &[u8]) -> Option<u16> {
    digits.iter().try_fold(0u16, |port, &digit| port.checked_mul(10)?.checked_add(u16::from(digit - b'0')))
}
