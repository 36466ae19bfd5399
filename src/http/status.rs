use crate::bytes::escape_ascii;
use crate::error::HttpParseError;

/// Parses the status-code field of a status line.
///
/// Only ASCII digits are accepted. The value is accumulated in base 10 and
/// any overflow of `u16` is rejected rather than wrapped.
pub fn parse_status_code(field: &[u8], max_escaped_chars: usize) -> Result<u16, HttpParseError> {
    let invalid = || HttpParseError::InvalidStatusCode(escape_ascii(field, max_escaped_chars));

    field.iter().try_fold(0u16, |acc, &b| {
        if !b.is_ascii_digit() {
            return Err(invalid());
        }
        acc.checked_mul(10)
            .and_then(|v| v.checked_add(u16::from(b - b'0')))
            .ok_or_else(invalid)
    })
}
