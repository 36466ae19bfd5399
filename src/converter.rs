//! Turns an indexed session archive into a [`Har`] log.
//!
//! Exchanges are converted one at a time in ascending id order. Each blob is
//! read into the same message buffer, parsed in place and copied out into
//! owned HAR values before the next blob overwrites it.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use indexmap::IndexMap;

use crate::archive::{Frame, FrameIndex, SazArchive};
use crate::bytes::{to_lowercase_text, to_text};
use crate::config::ConverterConfig;
use crate::content::ContentNormalizer;
use crate::content::body::{BodyText, decode_body, decode_untyped};
use crate::error::{ConvertError, Result};
use crate::har::{
    Content, Creator, Entry, HAR_VERSION, Har, Log, NameValue, PostData, Request, Response,
};
use crate::http::headers::HeaderList;
use crate::http::names;
use crate::http::params::{EncodedPair, PercentDecoding, cookie_pairs, query_pairs};
use crate::http::parser::MessageParser;
use crate::http::request::RawRequest;
use crate::http::response::RawResponse;

pub struct Converter<R> {
    archive: SazArchive<R>,
    index: FrameIndex,
    config: ConverterConfig,

    message: Vec<u8>,
    normalizer: ContentNormalizer,
    content_errors: usize,
}

impl Converter<BufReader<File>> {
    pub fn open(path: &Path, password: Option<String>, config: ConverterConfig) -> Result<Self> {
        Self::new(SazArchive::open(path, password)?, config)
    }
}

impl<R: Read + Seek> Converter<R> {
    /// Indexes `archive`. Fails when an entry name carries no usable id.
    pub fn new(archive: SazArchive<R>, config: ConverterConfig) -> Result<Self> {
        let index = archive.index(&config.entry_prefix)?;
        tracing::debug!(
            "indexed {} exchanges from {} archive entries",
            index.len(),
            archive.entry_count()
        );

        Ok(Self {
            archive,
            index,
            message: Vec::with_capacity(config.buffer_capacity),
            normalizer: ContentNormalizer::with_capacity(config.buffer_capacity),
            content_errors: 0,
            config,
        })
    }

    /// Converts every exchange. The first structural parse error aborts the
    /// run; content errors are recorded on the affected entry only.
    pub fn convert(mut self) -> Result<Har> {
        let index = std::mem::take(&mut self.index);
        let mut entries = Vec::with_capacity(index.len());
        for (id, frame) in index.iter() {
            entries.push(self.entry(id, frame)?);
        }

        tracing::info!(
            "converted {} exchanges ({} with unreadable content)",
            entries.len(),
            self.content_errors
        );

        Ok(Har {
            log: Log {
                version: HAR_VERSION,
                creator: Creator {
                    name: self.config.creator_name,
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    comment: self.config.creator_comment,
                },
                pages: Vec::new(),
                entries,
            },
        })
    }

    fn entry(&mut self, id: u32, frame: &Frame) -> Result<Entry> {
        tracing::debug!(
            "exchange #{id}: client={} server={} metadata={}",
            frame.client.is_some(),
            frame.server.is_some(),
            frame.metadata.is_some()
        );

        let request = match frame.client {
            Some(index) => self.request(id, index)?,
            None => None,
        };
        let response = match frame.server {
            Some(index) => self.response(id, index)?,
            None => None,
        };

        Ok(Entry {
            comment: format!("[#{id}]"),
            request,
            response,
        })
    }

    fn request(&mut self, id: u32, index: usize) -> Result<Option<Request>> {
        self.archive.read_entry(index, &mut self.message)?;
        if self.message.is_empty() {
            return Ok(None);
        }

        let raw = MessageParser::new(&self.message)
            .with_max_escaped_chars(self.config.max_escaped_chars)
            .parse_request()
            .map_err(|source| ConvertError::Message {
                id,
                role: "request",
                source,
            })?;

        Ok(Some(build_request(&raw, self.config.percent_decoding)))
    }

    fn response(&mut self, id: u32, index: usize) -> Result<Option<Response>> {
        self.archive.read_entry(index, &mut self.message)?;
        if self.message.is_empty() {
            return Ok(None);
        }

        let raw = MessageParser::new(&self.message)
            .with_max_escaped_chars(self.config.max_escaped_chars)
            .parse_response()
            .map_err(|source| ConvertError::Message {
                id,
                role: "response",
                source,
            })?;

        let mode = self.config.percent_decoding;
        let content_type = raw.headers.last(names::CONTENT_TYPE).unwrap_or_default();
        let (body, error) = match self.normalizer.normalize(raw.body, &raw.headers) {
            Ok(body) => (decode_body(body, content_type, mode), None),
            Err(err) => {
                let diagnostic = err.diagnostic();
                tracing::warn!("exchange #{id}: keeping raw response body, {diagnostic}");
                self.content_errors += 1;
                (decode_untyped(raw.body), Some(diagnostic))
            }
        };

        Ok(Some(Response {
            status: raw.status,
            status_text: to_text(raw.status_text),
            http_version: to_lowercase_text(raw.version),
            headers: headers(&raw.headers),
            cookies: set_cookies(&raw, mode),
            content: Content {
                size: raw.body.len(),
                error,
                mime_type: to_text(content_type),
                text: body.text,
                encoding: body.encoding.map(str::to_string),
            },
        }))
    }
}

fn build_request(raw: &RawRequest<'_>, mode: PercentDecoding) -> Request {
    let query_string = query_pairs(raw.query())
        .map(|pair| name_value(pair, mode))
        .collect();

    let cookies = raw
        .headers
        .all(names::COOKIE)
        .flat_map(cookie_pairs)
        .map(|pair| {
            NameValue::new(
                pair.decode_name(mode).trim(),
                pair.decode_value(mode).trim(),
            )
        })
        .collect();

    let post_data = (!raw.body.is_empty()).then(|| {
        let content_type = raw.headers.last(names::CONTENT_TYPE).unwrap_or_default();
        let BodyText {
            text,
            encoding,
            params,
        } = decode_body(raw.body, content_type, mode);
        PostData {
            mime_type: to_text(content_type),
            text,
            encoding: encoding.map(str::to_string),
            params,
        }
    });

    Request {
        method: to_text(raw.method),
        url: to_text(raw.target),
        http_version: to_lowercase_text(raw.version),
        headers: headers(&raw.headers),
        query_string,
        cookies,
        body_size: raw.body.len(),
        post_data,
    }
}

fn headers(headers: &HeaderList<'_>) -> Vec<NameValue> {
    headers
        .iter()
        .map(|(name, value)| NameValue::new(to_text(name), to_text(value)))
        .collect()
}

fn name_value(pair: EncodedPair<'_>, mode: PercentDecoding) -> NameValue {
    NameValue::new(pair.decode_name(mode), pair.decode_value(mode))
}

/// One map per `Set-Cookie` header: the leading pair becomes `name` and
/// `value`, each attribute is keyed by its lower-cased name.
fn set_cookies(raw: &RawResponse<'_>, mode: PercentDecoding) -> Vec<IndexMap<String, String>> {
    raw.headers
        .all(names::SET_COOKIE)
        .filter_map(|header| {
            let mut pairs = cookie_pairs(header);
            let first = pairs.next()?;

            let mut cookie = IndexMap::new();
            cookie.insert("name".to_string(), first.decode_name(mode).trim().to_string());
            cookie.insert("value".to_string(), first.decode_value(mode).trim().to_string());
            for attr in pairs {
                let key = attr.decode_name(mode).trim().to_ascii_lowercase();
                if key == "name" || key == "value" {
                    continue;
                }
                cookie.insert(key, attr.decode_value(mode).trim().to_string());
            }
            Some(cookie)
        })
        .collect()
}
