//! Response body normalization.
//!
//! A captured response body is stored exactly as it went over the wire. Before
//! it can be rendered it has to be de-framed (chunked transfer coding) and
//! decompressed (content coding), in that order. Both steps write into
//! buffers owned by [`ContentNormalizer`] that are cleared, not reallocated,
//! for every exchange; the slice returned by [`ContentNormalizer::normalize`]
//! is only valid until the next call.

pub mod body;
pub mod chunked;
pub mod coding;

use crate::bytes::trim_whitespace;
use crate::error::ContentError;
use crate::http::headers::HeaderList;
use crate::http::names;
use coding::ContentCoding;

pub struct ContentNormalizer {
    dechunked: Vec<u8>,
    decoded: Vec<u8>,
}

impl ContentNormalizer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            dechunked: Vec::with_capacity(capacity),
            decoded: Vec::with_capacity(capacity),
        }
    }

    /// Undoes the transfer and content codings declared by `headers`.
    ///
    /// Returns `body` itself when neither applies. An empty body is never
    /// transformed.
    pub fn normalize<'a>(
        &'a mut self,
        body: &'a [u8],
        headers: &HeaderList<'_>,
    ) -> Result<&'a [u8], ContentError> {
        let mut body = body;
        if body.is_empty() {
            return Ok(body);
        }

        if is_chunked(headers) {
            self.dechunked.clear();
            chunked::dechunk(body, &mut self.dechunked)?;
            body = &self.dechunked;
        }

        if let Some(value) = headers.last(names::CONTENT_ENCODING) {
            let coding = ContentCoding::from_header(value)?;
            if coding != ContentCoding::Identity && !body.is_empty() {
                coding::decode(coding, body, &mut self.decoded)?;
                body = &self.decoded;
            }
        }

        Ok(body)
    }
}

fn is_chunked(headers: &HeaderList<'_>) -> bool {
    headers
        .last(names::TRANSFER_ENCODING)
        .is_some_and(|value| trim_whitespace(value).eq_ignore_ascii_case(b"chunked"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    fn headers(list: &[(&'static str, &'static str)]) -> HeaderList<'static> {
        let mut headers = HeaderList::new();
        for (name, value) in list {
            headers.push(name.as_bytes(), value.as_bytes());
        }
        headers
    }

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut e = GzEncoder::new(Vec::new(), Compression::default());
        e.write_all(data).unwrap();
        e.finish().unwrap()
    }

    #[test]
    fn test_passthrough() {
        let mut normalizer = ContentNormalizer::with_capacity(16);
        let h = headers(&[("Content-Type", "text/plain")]);
        assert_eq!(normalizer.normalize(b"hi", &h).unwrap(), b"hi");
    }

    #[test]
    fn test_dechunk_then_decompress() {
        let compressed = gzip(b"ok");
        let mut body = format!("{:x}\r\n", compressed.len()).into_bytes();
        body.extend_from_slice(&compressed);
        body.extend_from_slice(b"\r\n0\r\n\r\n");

        let mut normalizer = ContentNormalizer::with_capacity(16);
        let h = headers(&[("Transfer-Encoding", "Chunked"), ("Content-Encoding", "GZIP")]);
        assert_eq!(normalizer.normalize(&body, &h).unwrap(), b"ok");
    }

    #[test]
    fn test_last_transfer_encoding_wins() {
        let mut normalizer = ContentNormalizer::with_capacity(16);
        let h = headers(&[("Transfer-Encoding", "chunked"), ("transfer-encoding", "identity")]);
        let body = b"2\r\nhi\r\n0\r\n\r\n";
        assert_eq!(normalizer.normalize(body, &h).unwrap(), body);
    }

    #[test]
    fn test_identity_and_empty_body_are_untouched() {
        let mut normalizer = ContentNormalizer::with_capacity(16);
        let h = headers(&[("Content-Encoding", "identity")]);
        assert_eq!(normalizer.normalize(b"raw", &h).unwrap(), b"raw");

        let h = headers(&[("Content-Encoding", "gzip"), ("Transfer-Encoding", "chunked")]);
        assert_eq!(normalizer.normalize(b"", &h).unwrap(), b"");
    }

    #[test]
    fn test_unsupported_coding() {
        let mut normalizer = ContentNormalizer::with_capacity(16);
        let h = headers(&[("Content-Encoding", "lzma")]);
        assert!(matches!(
            normalizer.normalize(b"data", &h),
            Err(ContentError::UnsupportedContentEncoding(_))
        ));
    }

    #[test]
    fn test_buffers_are_reused() {
        let mut normalizer = ContentNormalizer::with_capacity(16);
        let h = headers(&[("Transfer-Encoding", "chunked")]);
        assert_eq!(normalizer.normalize(b"3\r\nabc\r\n0\r\n\r\n", &h).unwrap(), b"abc");
        assert_eq!(normalizer.normalize(b"1\r\nz\r\n0\r\n\r\n", &h).unwrap(), b"z");
    }
}
