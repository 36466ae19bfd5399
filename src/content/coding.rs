use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};
use std::io::Read;

use crate::bytes::{to_text, trim_whitespace};
use crate::error::ContentError;

const BROTLI_BUFFER_SIZE: usize = 4096;

/// Content codings that can be undone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentCoding {
    Gzip,
    Deflate,
    Brotli,
    Identity,
}

impl ContentCoding {
    /// Resolves a `Content-Encoding` value, ignoring ASCII case.
    pub fn from_header(value: &[u8]) -> Result<Self, ContentError> {
        let value = trim_whitespace(value);
        let coding = if value.is_empty() || value.eq_ignore_ascii_case(b"identity") {
            ContentCoding::Identity
        } else if value.eq_ignore_ascii_case(b"gzip") || value.eq_ignore_ascii_case(b"x-gzip") {
            ContentCoding::Gzip
        } else if value.eq_ignore_ascii_case(b"deflate") {
            ContentCoding::Deflate
        } else if value.eq_ignore_ascii_case(b"brotli") || value.eq_ignore_ascii_case(b"br") {
            ContentCoding::Brotli
        } else {
            return Err(ContentError::UnsupportedContentEncoding(to_text(value)));
        };
        Ok(coding)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentCoding::Gzip => "gzip",
            ContentCoding::Deflate => "deflate",
            ContentCoding::Brotli => "brotli",
            ContentCoding::Identity => "identity",
        }
    }
}

/// Decodes `body` into `out`. `out` is cleared first; on error its content
/// is unspecified.
pub fn decode(coding: ContentCoding, body: &[u8], out: &mut Vec<u8>) -> Result<(), ContentError> {
    out.clear();
    let result = match coding {
        ContentCoding::Identity => {
            out.extend_from_slice(body);
            Ok(())
        }
        ContentCoding::Gzip => match GzDecoder::new(body).read_to_end(out) {
            Ok(_) => Ok(()),
            Err(err) => {
                // Some captures label raw deflate streams as gzip
                tracing::debug!("gzip decoding failed ({err}), retrying as raw deflate");
                out.clear();
                DeflateDecoder::new(body).read_to_end(out).map(|_| ())
            }
        },
        ContentCoding::Deflate => {
            if looks_like_zlib(body) {
                ZlibDecoder::new(body).read_to_end(out).map(|_| ())
            } else {
                DeflateDecoder::new(body).read_to_end(out).map(|_| ())
            }
        }
        ContentCoding::Brotli => brotli::Decompressor::new(body, BROTLI_BUFFER_SIZE)
            .read_to_end(out)
            .map(|_| ()),
    };

    result.map_err(|source| ContentError::Decompress {
        coding: coding.as_str(),
        source,
    })
}

/// RFC 1950 header check: deflate method with a valid FCHECK.
fn looks_like_zlib(body: &[u8]) -> bool {
    match body {
        [cmf, flg, ..] => cmf & 0x0F == 8 && (u16::from(*cmf) << 8 | u16::from(*flg)) % 31 == 0,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::{DeflateEncoder, GzEncoder, ZlibEncoder};
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut e = GzEncoder::new(Vec::new(), Compression::default());
        e.write_all(data).unwrap();
        e.finish().unwrap()
    }

    fn raw_deflate(data: &[u8]) -> Vec<u8> {
        let mut e = DeflateEncoder::new(Vec::new(), Compression::default());
        e.write_all(data).unwrap();
        e.finish().unwrap()
    }

    fn zlib(data: &[u8]) -> Vec<u8> {
        let mut e = ZlibEncoder::new(Vec::new(), Compression::default());
        e.write_all(data).unwrap();
        e.finish().unwrap()
    }

    fn brotli(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut w = brotli::CompressorWriter::new(&mut out, 4096, 5, 22);
            w.write_all(data).unwrap();
        }
        out
    }

    fn run(coding: ContentCoding, body: &[u8]) -> Result<Vec<u8>, ContentError> {
        let mut out = Vec::new();
        decode(coding, body, &mut out).map(|_| out)
    }

    #[test]
    fn test_from_header() {
        assert_eq!(ContentCoding::from_header(b"GZIP").unwrap(), ContentCoding::Gzip);
        assert_eq!(ContentCoding::from_header(b" deflate ").unwrap(), ContentCoding::Deflate);
        assert_eq!(ContentCoding::from_header(b"Brotli").unwrap(), ContentCoding::Brotli);
        assert_eq!(ContentCoding::from_header(b"br").unwrap(), ContentCoding::Brotli);
        assert_eq!(ContentCoding::from_header(b"identity").unwrap(), ContentCoding::Identity);
        assert!(matches!(
            ContentCoding::from_header(b"lzma"),
            Err(ContentError::UnsupportedContentEncoding(name)) if name == "lzma"
        ));
        assert!(matches!(
            ContentCoding::from_header(b"gzip, br"),
            Err(ContentError::UnsupportedContentEncoding(_))
        ));
    }

    #[test]
    fn test_gzip() {
        assert_eq!(run(ContentCoding::Gzip, &gzip(b"ok")).unwrap(), b"ok");
    }

    #[test]
    fn test_gzip_label_over_raw_deflate() {
        let body = raw_deflate(b"mislabelled");
        assert_eq!(run(ContentCoding::Gzip, &body).unwrap(), b"mislabelled");
    }

    #[test]
    fn test_deflate_raw_and_zlib() {
        assert_eq!(run(ContentCoding::Deflate, &raw_deflate(b"raw")).unwrap(), b"raw");
        assert_eq!(run(ContentCoding::Deflate, &zlib(b"wrapped")).unwrap(), b"wrapped");
    }

    #[test]
    fn test_brotli() {
        let text = b"brotli compressed text, brotli compressed text";
        assert_eq!(run(ContentCoding::Brotli, &brotli(text)).unwrap(), text);
    }

    #[test]
    fn test_corrupt_stream() {
        let full = brotli(b"a brotli stream that gets cut short before its last meta-block");
        let err = run(ContentCoding::Brotli, &full[..full.len() / 2]).unwrap_err();
        assert_eq!(err.kind(), "Decompress");
        assert!(err.to_string().starts_with("brotli decoding failed"));
    }

    #[test]
    fn test_output_is_reset() {
        let mut out = b"stale".to_vec();
        decode(ContentCoding::Gzip, &gzip(b"fresh"), &mut out).unwrap();
        assert_eq!(out, b"fresh");
    }
}
