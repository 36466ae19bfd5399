//! Byte-span helpers shared by the message parser, the pair enumerators and
//! the content normalizer.
//!
//! Everything here works on borrowed `&[u8]` spans and never allocates unless
//! it has to produce an owned `String`. Case-insensitive comparisons only fold
//! ASCII letters; bytes `>= 0x80` are compared as-is.

pub const CRLF: &[u8] = b"\r\n";

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Returns `true` when `haystack` begins with `prefix`, ignoring ASCII case.
pub fn starts_with_ignore_case(haystack: &[u8], prefix: &[u8]) -> bool {
    haystack.len() >= prefix.len() && haystack[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// Returns `true` when `haystack` ends with `suffix`, ignoring ASCII case.
pub fn ends_with_ignore_case(haystack: &[u8], suffix: &[u8]) -> bool {
    haystack.len() >= suffix.len()
        && haystack[haystack.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
}

pub fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

pub fn find_crlf(haystack: &[u8]) -> Option<usize> {
    find(haystack, CRLF)
}

/// Splits `input` at the first `delimiter`, returning the part before it and
/// advancing `input` past the delimiter. Leaves `input` untouched and returns
/// `None` when the delimiter is absent.
pub fn read_to<'a>(input: &mut &'a [u8], delimiter: u8) -> Option<&'a [u8]> {
    let rest: &'a [u8] = *input;
    let idx = rest.iter().position(|&b| b == delimiter)?;
    *input = &rest[idx + 1..];
    Some(&rest[..idx])
}

/// Same as [`read_to`] but the end of input also counts as a delimiter.
pub fn read_to_or_end<'a>(input: &mut &'a [u8], delimiter: u8) -> &'a [u8] {
    match read_to(input, delimiter) {
        Some(span) => span,
        None => std::mem::take(input),
    }
}

pub fn is_whitespace(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

/// Trims leading and trailing spaces and tabs.
pub fn trim_whitespace(mut bytes: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = bytes {
        if !is_whitespace(*first) {
            break;
        }
        bytes = rest;
    }
    while let [rest @ .., last] = bytes {
        if !is_whitespace(*last) {
            break;
        }
        bytes = rest;
    }
    bytes
}

pub fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Parses a non-empty run of hex digits. Fails on any other byte or on
/// overflow.
pub fn parse_hex(bytes: &[u8]) -> Option<usize> {
    if bytes.is_empty() {
        return None;
    }
    bytes.iter().try_fold(0usize, |acc, &b| {
        let digit = hex_value(b)?;
        acc.checked_mul(16)?.checked_add(digit as usize)
    })
}

/// Renders bytes as text, replacing invalid UTF-8 sequences.
pub fn to_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Renders bytes as text with ASCII letters lower-cased.
pub fn to_lowercase_text(bytes: &[u8]) -> String {
    to_text(&bytes.to_ascii_lowercase())
}

/// Renders bytes for diagnostics: control and non-ASCII bytes become `\xHH`
/// and the output is cut after `max_chars` source bytes with a trailing `...`.
pub fn escape_ascii(bytes: &[u8], max_chars: usize) -> String {
    let truncated = bytes.len() > max_chars;
    let shown = if truncated { &bytes[..max_chars] } else { bytes };

    let mut out = String::with_capacity(shown.len() + if truncated { 3 } else { 0 });
    for &b in shown {
        if b < 0x20 || b >= 0x7F {
            out.push('\\');
            out.push('x');
            out.push(HEX_DIGITS[(b >> 4) as usize] as char);
            out.push(HEX_DIGITS[(b & 0x0F) as usize] as char);
        } else {
            out.push(b as char);
        }
    }
    if truncated {
        out.push_str("...");
    }
    out
}
