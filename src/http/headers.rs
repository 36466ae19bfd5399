//! Ordered header list for [`RawRequest`](crate::http::request::RawRequest) and
//! [`RawResponse`](crate::http::response::RawResponse).
//!
//! Headers are kept in capture order, duplicates included, because the log
//! reproduces them exactly as they appeared on the wire. Names keep their
//! original casing; lookups compare names ignoring ASCII case. When a single
//! value is needed, the last occurrence wins.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderList<'a> {
    headers: Vec<(&'a [u8], &'a [u8])>,
}

impl<'a> HeaderList<'a> {
    pub fn new() -> Self {
        Self {
            headers: Vec::with_capacity(16),
        }
    }

    pub fn push(&mut self, name: &'a [u8], value: &'a [u8]) {
        self.headers.push((name, value));
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a [u8], &'a [u8])> + '_ {
        self.headers.iter().copied()
    }

    /// Every value of the headers called `name`, in order.
    pub fn all<'s>(&'s self, name: &'s [u8]) -> impl Iterator<Item = &'a [u8]> + 's {
        self.headers
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
            .map(|&(_, v)| v)
    }

    /// Value of the last header called `name`.
    pub fn last(&self, name: &[u8]) -> Option<&'a [u8]> {
        self.headers
            .iter()
            .rev()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|&(_, v)| v)
    }
}
