use crate::bytes::{escape_ascii, find_crlf, read_to, read_to_or_end, trim_whitespace};
use crate::error::HttpParseError;
use crate::http::headers::HeaderList;
use crate::http::request::RawRequest;
use crate::http::response::RawResponse;
use crate::http::status::parse_status_code;

const DEFAULT_MAX_ESCAPED_CHARS: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd)]
enum ParserState {
    StartLine,
    Headers,
    Body,
}

/// Splits one captured message into start line, headers and body.
///
/// The phases run strictly in order over a single cursor and never look
/// back: once the start line has been consumed its bytes are not scanned
/// again.
pub struct MessageParser<'a> {
    rest: &'a [u8],
    state: ParserState,
    max_escaped_chars: usize,
}

impl<'a> MessageParser<'a> {
    pub fn new(message: &'a [u8]) -> Self {
        Self {
            rest: message,
            state: ParserState::StartLine,
            max_escaped_chars: DEFAULT_MAX_ESCAPED_CHARS,
        }
    }

    pub fn with_max_escaped_chars(mut self, max_escaped_chars: usize) -> Self {
        self.max_escaped_chars = max_escaped_chars;
        self
    }

    pub fn parse_request(mut self) -> Result<RawRequest<'a>, HttpParseError> {
        let line = self.start_line()?;
        let malformed = || HttpParseError::MalformedRequestLine(self.escape(line));

        // Request line: METHOD SP TARGET SP VERSION
        let mut rest = line;
        let method = read_to(&mut rest, b' ').ok_or_else(malformed)?;
        if method.is_empty() || rest.is_empty() {
            return Err(malformed());
        }
        let target = read_to(&mut rest, b' ').ok_or_else(malformed)?;
        if target.is_empty() || rest.is_empty() {
            return Err(malformed());
        }
        let version = rest;

        let headers = self.parse_headers()?;
        Ok(RawRequest {
            method,
            target,
            version,
            headers,
            body: self.body(),
        })
    }

    pub fn parse_response(mut self) -> Result<RawResponse<'a>, HttpParseError> {
        let line = self.start_line()?;
        let malformed = || HttpParseError::MalformedResponseLine(self.escape(line));

        // Status line: VERSION SP STATUS [SP TEXT]
        let mut rest = line;
        let version = read_to(&mut rest, b' ').ok_or_else(malformed)?;
        if version.is_empty() || rest.is_empty() {
            return Err(malformed());
        }
        let status = read_to_or_end(&mut rest, b' ');
        if status.is_empty() {
            return Err(malformed());
        }
        let status = parse_status_code(status, self.max_escaped_chars)?;
        let status_text = rest;

        let headers = self.parse_headers()?;
        Ok(RawResponse {
            version,
            status,
            status_text,
            headers,
            body: self.body(),
        })
    }

    fn start_line(&mut self) -> Result<&'a [u8], HttpParseError> {
        debug_assert_eq!(self.state, ParserState::StartLine);

        let end = find_crlf(self.rest).ok_or(HttpParseError::EmptyStartLine)?;
        if end == 0 {
            return Err(HttpParseError::EmptyStartLine);
        }

        let line = &self.rest[..end];
        self.rest = &self.rest[end + 2..];
        self.state = ParserState::Headers;
        Ok(line)
    }

    fn parse_headers(&mut self) -> Result<HeaderList<'a>, HttpParseError> {
        debug_assert_eq!(self.state, ParserState::Headers);

        let mut headers = HeaderList::new();
        loop {
            let end = find_crlf(self.rest).ok_or(HttpParseError::UnterminatedHeaders)?;
            let line = &self.rest[..end];
            self.rest = &self.rest[end + 2..];

            // An empty line ends the header block
            if line.is_empty() {
                break;
            }

            let separator = line
                .iter()
                .position(|&b| b == b':' || b == b' ' || b == b'\t');
            match separator {
                Some(idx) if idx > 0 => {
                    headers.push(&line[..idx], trim_whitespace(&line[idx + 1..]));
                }
                _ => return Err(HttpParseError::MalformedHeader(self.escape(line))),
            }
        }

        self.state = ParserState::Body;
        Ok(headers)
    }

    fn body(self) -> &'a [u8] {
        debug_assert_eq!(self.state, ParserState::Body);
        self.rest
    }

    fn escape(&self, bytes: &[u8]) -> String {
        escape_ascii(bytes, self.max_escaped_chars)
    }
}

pub fn parse_request(message: &[u8]) -> Result<RawRequest<'_>, HttpParseError> {
    MessageParser::new(message).parse_request()
}

pub fn parse_response(message: &[u8]) -> Result<RawResponse<'_>, HttpParseError> {
    MessageParser::new(message).parse_response()
}
