//! Byte classification tables.
//!
//! Every table is a `[_; 256]` built at compile time, so a lookup is a single index with
//! no branching on the byte value.

/// Header-field token characters, mapped to their lowercase form. Non-token bytes map to 0.
///
/// `tchar = "!" / "#" / "$" / "%" / "&" / "'" / "*" / "+" / "-" / "." / "^" / "_" / "`" / "|" / "~" / DIGIT / ALPHA`
pub(crate) static TOKENS: [u8; 256] = build_tokens();

/// Bytes allowed in the path, query and fragment of a request target.
static URL_CHARS: [bool; 256] = build_url_chars();

/// Hex digit values, `NOT_HEX` for anything else.
static UNHEX: [u8; 256] = build_unhex();

pub(crate) const NOT_HEX: u8 = 0xFF;

const fn is_tchar(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(b, b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_' | b'`' | b'|' | b'~')
}

#[allow(clippy::cast_possible_truncation, reason = "the index stays below 256")]
const fn build_tokens() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let b = i as u8;
        if is_tchar(b) {
            table[i] = b.to_ascii_lowercase();
        }
        i += 1;
    }
    table
}

#[allow(clippy::cast_possible_truncation, reason = "the index stays below 256")]
const fn build_url_chars() -> [bool; 256] {
    let mut table = [false; 256];
    let mut i = 0;
    while i < 256 {
        let b = i as u8;
        // visible ascii except the two delimiters, plus any obs-text byte
        table[i] = (b > 0x20 && b < 0x7F && b != b'#' && b != b'?') || b >= 0x80;
        i += 1;
    }
    table
}

#[allow(clippy::cast_possible_truncation, reason = "the index stays below 256")]
const fn build_unhex() -> [u8; 256] {
    let mut table = [NOT_HEX; 256];
    let mut i = 0;
    while i < 256 {
        let b = i as u8;
        table[i] = match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b - b'a' + 10,
            b'A'..=b'F' => b - b'A' + 10,
            _ => NOT_HEX,
        };
        i += 1;
    }
    table
}

/// Returns the lowercase token form of `b`, or `None` if `b` may not appear in a header name.
#[inline]
pub(crate) fn token(b: u8) -> Option<u8> {
    match TOKENS[b as usize] {
        0 => None,
        lower => Some(lower),
    }
}

#[inline]
pub(crate) fn is_url_char(b: u8) -> bool {
    URL_CHARS[b as usize]
}

#[inline]
pub(crate) fn unhex(b: u8) -> Option<u8> {
    match UNHEX[b as usize] {
        NOT_HEX => None,
        value => Some(value),
    }
}

#[inline]
pub(crate) fn is_hex(b: u8) -> bool {
    UNHEX[b as usize] != NOT_HEX
}

#[inline]
pub(crate) fn is_mark(b: u8) -> bool {
    matches!(b, b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')')
}

#[inline]
pub(crate) fn is_userinfo_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || is_mark(b) || matches!(b, b'%' | b';' | b':' | b'&' | b'=' | b'+' | b'$' | b',')
}

#[inline]
pub(crate) fn is_host_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-' | b'_')
}

/// Bytes allowed inside a header value: HT, visible ascii, SP and obs-text.
#[inline]
pub(crate) fn is_header_char(b: u8) -> bool {
    b == b'\t' || (b >= b' ' && b != 0x7F)
}
