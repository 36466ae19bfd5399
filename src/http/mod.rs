//! Raw HTTP/1.x message handling.
//!
//! Messages are parsed straight from the captured bytes: every field of a
//! [`RawRequest`](request::RawRequest) or [`RawResponse`](response::RawResponse)
//! is a span borrowed from the buffer the message was read into. Nothing is
//! validated beyond what is needed to locate the start line, the header
//! block and the body.

pub mod headers;
pub mod params;
pub mod parser;
pub mod request;
pub mod response;
pub mod status;

/// Header names the converter looks up. Lookups ignore ASCII case.
pub mod names {
    pub const COOKIE: &[u8] = b"cookie";
    pub const SET_COOKIE: &[u8] = b"set-cookie";
    pub const CONTENT_TYPE: &[u8] = b"content-type";
    pub const CONTENT_ENCODING: &[u8] = b"content-encoding";
    pub const TRANSFER_ENCODING: &[u8] = b"transfer-encoding";
}
