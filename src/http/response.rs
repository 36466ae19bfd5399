use crate::http::headers::HeaderList;

/// A server response split into its parts. The body is still in its
/// transfer/content coded form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse<'a> {
    pub version: &'a [u8],
    pub status: u16,
    pub status_text: &'a [u8],

    pub headers: HeaderList<'a>,
    pub body: &'a [u8],
}
