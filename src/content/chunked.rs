use crate::bytes::{find_crlf, parse_hex, read_to_or_end, trim_whitespace, CRLF};
use crate::error::ContentError;

/// Removes chunked transfer framing from `body`, appending the payload to
/// `out`. Chunk extensions and trailers are discarded.
pub fn dechunk(body: &[u8], out: &mut Vec<u8>) -> Result<(), ContentError> {
    let mut offset = 0;

    loop {
        if offset >= body.len() {
            return Err(ContentError::MissingFinalChunk);
        }

        // A size line cut off by the end of the blob never reached the last chunk
        let remaining = &body[offset..];
        let line_end = find_crlf(remaining).ok_or(ContentError::MissingFinalChunk)?;

        // chunk-size [; chunk-ext]
        let mut line = &remaining[..line_end];
        let size = trim_whitespace(read_to_or_end(&mut line, b';'));
        let size = parse_hex(size).ok_or(ContentError::CorruptChunkFraming { offset })?;

        let data_start = offset + line_end + CRLF.len();
        if size == 0 {
            return Ok(());
        }

        let available = body.len() - data_start;
        if size > available {
            return Err(ContentError::CorruptChunkBody {
                offset: data_start,
                declared: size,
                remaining: available,
            });
        }

        let data_end = data_start + size;
        out.extend_from_slice(&body[data_start..data_end]);

        // Chunk data is followed by CRLF
        let tail = &body[data_end..];
        if !tail.starts_with(CRLF) {
            if CRLF.starts_with(tail) {
                return Err(ContentError::MissingFinalChunk);
            }
            return Err(ContentError::CorruptChunkFraming { offset: data_end });
        }
        offset = data_end + CRLF.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(body: &[u8]) -> Result<Vec<u8>, ContentError> {
        let mut out = Vec::new();
        dechunk(body, &mut out).map(|_| out)
    }

    #[test]
    fn test_single_chunk() {
        assert_eq!(run(b"2\r\nhi\r\n0\r\n\r\n").unwrap(), b"hi");
    }

    #[test]
    fn test_multiple_chunks_with_extensions_and_trailers() {
        let body = b"5;name=value\r\nhello\r\n1A\r\nabcdefghijklmnopqrstuvwxyz\r\n0\r\nX-Trailer: 1\r\n\r\n";
        assert_eq!(run(body).unwrap(), b"helloabcdefghijklmnopqrstuvwxyz");
    }

    #[test]
    fn test_size_line_padding() {
        assert_eq!(run(b"3 \r\nabc\r\n0\r\n\r\n").unwrap(), b"abc");
    }

    #[test]
    fn test_empty_body_is_missing_final_chunk() {
        assert!(matches!(run(b""), Err(ContentError::MissingFinalChunk)));
    }

    #[test]
    fn test_runs_out_before_zero_chunk() {
        assert!(matches!(
            run(b"2\r\nhi\r\n"),
            Err(ContentError::MissingFinalChunk)
        ));
    }

    #[test]
    fn test_blob_cut_short_is_missing_final_chunk() {
        for body in [&b"2"[..], b"2\r\nhi", b"2\r\nhi\r", b"2\r\nhi\r\n0", b"2\r\nhi\r\n0;ext"] {
            assert!(
                matches!(run(body), Err(ContentError::MissingFinalChunk)),
                "{body:?}"
            );
        }
    }

    #[test]
    fn test_bad_size_line() {
        assert!(matches!(
            run(b"zz\r\nhi\r\n0\r\n\r\n"),
            Err(ContentError::CorruptChunkFraming { offset: 0 })
        ));
        assert!(matches!(
            run(b"\r\nhi"),
            Err(ContentError::CorruptChunkFraming { offset: 0 })
        ));
    }

    #[test]
    fn test_declared_size_exceeds_remaining() {
        assert!(matches!(
            run(b"10\r\nshort\r\n0\r\n\r\n"),
            Err(ContentError::CorruptChunkBody {
                offset: 4,
                declared: 16,
                remaining: 12,
            })
        ));
    }

    #[test]
    fn test_missing_crlf_after_data() {
        assert!(matches!(
            run(b"2\r\nhiX0\r\n\r\n"),
            Err(ContentError::CorruptChunkFraming { offset: 5 })
        ));
    }

    #[test]
    fn test_appends_to_existing_output() {
        let mut out = b"pre:".to_vec();
        dechunk(b"1\r\nx\r\n0\r\n\r\n", &mut out).unwrap();
        assert_eq!(out, b"pre:x");
    }
}
