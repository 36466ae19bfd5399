//! Converts Fiddler session archives (`.saz`) into HTTP Archive (HAR 1.2)
//! documents.
//!
//! The raw request and response blobs of every captured exchange are parsed
//! directly from bytes, response bodies are de-chunked and decompressed, and
//! the result is collected into a [`har::Har`] ready for serialization.

pub mod archive;
pub mod bytes;
pub mod config;
pub mod content;
pub mod converter;
pub mod error;
pub mod har;
pub mod http;
pub mod logging;

pub use config::ConverterConfig;
pub use converter::Converter;
pub use error::{ContentError, ConvertError, HttpParseError};
pub use har::Har;
