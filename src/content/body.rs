use base64::{Engine, engine::general_purpose::STANDARD};
use encoding_rs::{Encoding, UTF_8};

use crate::bytes::{read_to_or_end, starts_with_ignore_case, to_text, trim_whitespace};
use crate::har::NameValue;
use crate::http::params::{PercentDecoding, cookie_pairs, query_pairs};

const TEXT_MEDIA_PREFIX: &[u8] = b"text/";
const FORM_MEDIA_TYPE: &[u8] = b"application/x-www-form-urlencoded";
const TEXT_MEDIA_TYPES: [&[u8]; 4] = [
    b"application/json",
    b"application/x-json-stream",
    b"application/xml",
    FORM_MEDIA_TYPE,
];

/// A body rendered for the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyText {
    pub text: String,
    /// `Some("base64")` when `text` is the base64 form of binary content.
    pub encoding: Option<&'static str>,
    /// Decoded fields of an url-encoded form body.
    pub params: Option<Vec<NameValue>>,
}

/// Media type of a `Content-Type` value, without parameters.
pub fn media_type(content_type: &[u8]) -> &[u8] {
    let mut rest = content_type;
    trim_whitespace(read_to_or_end(&mut rest, b';'))
}

pub fn is_text_media(media: &[u8]) -> bool {
    starts_with_ignore_case(media, TEXT_MEDIA_PREFIX)
        || TEXT_MEDIA_TYPES.iter().any(|t| media.eq_ignore_ascii_case(t))
}

/// Decoder named by the `charset` parameter of a `Content-Type` value,
/// UTF-8 when absent or unknown.
pub fn charset(content_type: &[u8]) -> &'static Encoding {
    let label = cookie_pairs(content_type)
        .filter(|p| p.name.eq_ignore_ascii_case(b"charset"))
        .filter_map(|p| p.value)
        .last();

    let Some(label) = label else {
        return UTF_8;
    };
    let label = trim_whitespace(label);
    let label = label
        .strip_prefix(b"\"")
        .and_then(|l| l.strip_suffix(b"\""))
        .unwrap_or(label);

    if label.eq_ignore_ascii_case(b"utf-8") {
        return UTF_8;
    }
    Encoding::for_label(label).unwrap_or_else(|| {
        tracing::warn!("unknown charset {:?}, decoding as UTF-8", to_text(label));
        UTF_8
    })
}

/// Renders `body` according to its `Content-Type`. Text media types are
/// decoded with their declared charset; anything else goes through
/// [`decode_untyped`].
pub fn decode_body(body: &[u8], content_type: &[u8], mode: PercentDecoding) -> BodyText {
    let media = media_type(content_type);
    if !is_text_media(media) {
        return decode_untyped(body);
    }

    let (text, _) = charset(content_type).decode_without_bom_handling(body);
    let text = text.into_owned();

    let params = media.eq_ignore_ascii_case(FORM_MEDIA_TYPE).then(|| {
        query_pairs(text.as_bytes())
            .map(|p| NameValue::new(p.decode_name(mode), p.decode_value(mode)))
            .collect()
    });

    BodyText {
        text,
        encoding: None,
        params,
    }
}

/// Renders a body of unknown type: base64 when it contains a NUL byte,
/// otherwise the bytes as a string.
pub fn decode_untyped(body: &[u8]) -> BodyText {
    if body.contains(&0) {
        BodyText {
            text: STANDARD.encode(body),
            encoding: Some("base64"),
            params: None,
        }
    } else {
        BodyText {
            text: to_text(body),
            encoding: None,
            params: None,
        }
    }
}
