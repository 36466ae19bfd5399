use serde::Deserialize;
use std::path::Path;

use crate::http::params::PercentDecoding;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Archive path prefix under which the per-exchange entries live.
    pub entry_prefix: String,

    /// Initial capacity of each reusable message/transform buffer.
    pub buffer_capacity: usize,

    /// Longest byte span echoed back in error messages.
    pub max_escaped_chars: usize,

    pub percent_decoding: PercentDecoding,

    pub creator_name: String,
    pub creator_comment: Option<String>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            entry_prefix: "raw/".to_string(),
            buffer_capacity: 0x20000, // 128 KiB

            max_escaped_chars: 128,

            percent_decoding: PercentDecoding::Full,

            creator_name: "saz2har".to_string(),
            creator_comment: None,
        }
    }
}

impl ConverterConfig {
    pub fn from_file(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Fail to read {}: {err}", path.display());
                tracing::warn!("Fall back to default config");
                return ConverterConfig::default();
            }
        };

        Self::from_toml(&content).unwrap_or_else(|err| {
            tracing::warn!("Fail to deserialize config file {}: {err}", path.display());
            tracing::warn!("Fall back to default config");
            ConverterConfig::default()
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<ConverterConfig>(content)
    }
}
