//! Lazy name/value splitting for cookie headers, header parameters, query
//! strings and url-encoded form bodies.
//!
//! [`EncodedPairs`] only slices the input; nothing is decoded until
//! [`EncodedPair::decode_name`] or [`EncodedPair::decode_value`] is called.
//! The enumerator is `Copy`, so cloning it restarts the walk.

use serde::Deserialize;
use std::borrow::Cow;

use crate::bytes::{hex_value, read_to_or_end, trim_whitespace};

/// How `%XX` escapes are undone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PercentDecoding {
    /// Decode every valid escape.
    #[default]
    Full,
    /// Stop copying right after the first decoded escape. Output compatible
    /// with older converters that truncated values this way.
    FirstEscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairFlavor {
    /// `;`-separated, whitespace around segments ignored, `+` kept as-is.
    Cookie,
    /// `&`-separated, `+` decodes to a space.
    Query,
}

impl PairFlavor {
    fn separator(self) -> u8 {
        match self {
            PairFlavor::Cookie => b';',
            PairFlavor::Query => b'&',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedPair<'a> {
    pub name: &'a [u8],
    pub value: Option<&'a [u8]>,
    flavor: PairFlavor,
}

impl<'a> EncodedPair<'a> {
    pub fn decode_name(&self, mode: PercentDecoding) -> Cow<'a, str> {
        decode_component(self.name, self.flavor == PairFlavor::Query, mode)
    }

    /// Decodes the value; a segment without `=` has an empty value.
    pub fn decode_value(&self, mode: PercentDecoding) -> Cow<'a, str> {
        decode_component(self.value.unwrap_or_default(), self.flavor == PairFlavor::Query, mode)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EncodedPairs<'a> {
    rest: &'a [u8],
    flavor: PairFlavor,
}

impl<'a> EncodedPairs<'a> {
    pub fn new(input: &'a [u8], flavor: PairFlavor) -> Self {
        let rest = input.strip_prefix(b"?").unwrap_or(input);
        Self { rest, flavor }
    }
}

/// Pairs of a `Cookie`/`Set-Cookie` value or of header parameters such as
/// `text/html; charset=utf-8`.
pub fn cookie_pairs(input: &[u8]) -> EncodedPairs<'_> {
    EncodedPairs::new(input, PairFlavor::Cookie)
}

/// Pairs of a query string or an `application/x-www-form-urlencoded` body.
pub fn query_pairs(input: &[u8]) -> EncodedPairs<'_> {
    EncodedPairs::new(input, PairFlavor::Query)
}

impl<'a> Iterator for EncodedPairs<'a> {
    type Item = EncodedPair<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.rest.is_empty() {
            let mut segment = read_to_or_end(&mut self.rest, self.flavor.separator());
            if self.flavor == PairFlavor::Cookie {
                segment = trim_whitespace(segment);
            }
            if segment.is_empty() {
                continue;
            }

            let pair = match segment.iter().position(|&b| b == b'=') {
                Some(idx) => EncodedPair {
                    name: &segment[..idx],
                    value: Some(&segment[idx + 1..]),
                    flavor: self.flavor,
                },
                None => EncodedPair {
                    name: segment,
                    value: None,
                    flavor: self.flavor,
                },
            };
            return Some(pair);
        }
        None
    }
}

/// Undoes `%XX` escapes (and `+` when `plus_as_space` is set).
///
/// An escape is only honored when two more bytes follow the `%` and both are
/// hex digits; anything else is copied through unchanged.
pub fn percent_decode(input: &[u8], plus_as_space: bool, mode: PercentDecoding) -> Cow<'_, [u8]> {
    let needs_work = input
        .iter()
        .any(|&b| b == b'%' || (plus_as_space && b == b'+'));
    if !needs_work {
        return Cow::Borrowed(input);
    }

    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        let b = input[i];
        if b == b'%' && i + 2 < input.len() {
            if let (Some(hi), Some(lo)) = (hex_value(input[i + 1]), hex_value(input[i + 2])) {
                out.push((hi << 4) | lo);
                i += 3;
                if mode == PercentDecoding::FirstEscape {
                    break;
                }
                continue;
            }
        }
        out.push(if plus_as_space && b == b'+' { b' ' } else { b });
        i += 1;
    }
    Cow::Owned(out)
}

fn decode_component(input: &[u8], plus_as_space: bool, mode: PercentDecoding) -> Cow<'_, str> {
    match percent_decode(input, plus_as_space, mode) {
        Cow::Borrowed(bytes) => String::from_utf8_lossy(bytes),
        Cow::Owned(bytes) => match String::from_utf8(bytes) {
            Ok(text) => Cow::Owned(text),
            Err(err) => Cow::Owned(String::from_utf8_lossy(err.as_bytes()).into_owned()),
        },
    }
}
