use thiserror::Error;

/// Structural failures while splitting a raw message into start line,
/// headers and body. Any of these aborts the whole conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpParseError {
    #[error("empty start line")]
    EmptyStartLine,

    #[error("invalid request line: {0}")]
    MalformedRequestLine(String),

    #[error("invalid response line: {0}")]
    MalformedResponseLine(String),

    #[error("invalid status code value: {0}")]
    InvalidStatusCode(String),

    #[error("invalid HTTP header: {0}")]
    MalformedHeader(String),

    #[error("the message does not contain an empty line after its headers")]
    UnterminatedHeaders,
}

/// Failures while undoing transfer or content codings of a response body.
/// These are contained to a single exchange.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("the chunked content is corrupt, chunk size is missing or malformed at offset {offset}")]
    CorruptChunkFraming { offset: usize },

    #[error(
        "the chunked content is corrupt, chunk at offset {offset} declares {declared} bytes but only {remaining} remain"
    )]
    CorruptChunkBody {
        offset: usize,
        declared: usize,
        remaining: usize,
    },

    #[error("chunked body did not terminate with a 0-sized chunk")]
    MissingFinalChunk,

    #[error("unsupported content encoding: {0}")]
    UnsupportedContentEncoding(String),

    #[error("{coding} decoding failed: {source}")]
    Decompress {
        coding: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl ContentError {
    /// Stable name of the failure, used as the prefix of the `:error`
    /// diagnostic written into the log.
    pub fn kind(&self) -> &'static str {
        match self {
            ContentError::CorruptChunkFraming { .. } => "CorruptChunkFraming",
            ContentError::CorruptChunkBody { .. } => "CorruptChunkBody",
            ContentError::MissingFinalChunk => "MissingFinalChunk",
            ContentError::UnsupportedContentEncoding(_) => "UnsupportedContentEncoding",
            ContentError::Decompress { .. } => "Decompress",
        }
    }

    pub fn diagnostic(&self) -> String {
        format!("{}: {}", self.kind(), self)
    }
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("malformed archive index, cannot read an exchange id from entry {0:?}")]
    MalformedArchiveIndex(String),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("exchange #{id} {role}: {source}")]
    Message {
        id: u32,
        role: &'static str,
        #[source]
        source: HttpParseError,
    },
}

pub type Result<T> = std::result::Result<T, ConvertError>;
