use crate::http::headers::HeaderList;

/// A client request split into its parts. All spans borrow from the buffer
/// the captured message was read into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRequest<'a> {
    pub method: &'a [u8],
    pub target: &'a [u8],
    pub version: &'a [u8],

    pub headers: HeaderList<'a>,
    pub body: &'a [u8],
}

impl<'a> RawRequest<'a> {
    /// The part of the request target after the first `?`, empty when the
    /// target has no query.
    pub fn query(&self) -> &'a [u8] {
        match self.target.iter().position(|&b| b == b'?') {
            Some(idx) => &self.target[idx + 1..],
            None => &[],
        }
    }
}
