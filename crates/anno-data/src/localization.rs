//! Localization table: `guid=text` lines from a UTF-16 text file.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Errors that can occur while reading a localization table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocalizationError {
    #[error("duplicate localization key {key:?} on line {line}")]
    DuplicateKey { key: String, line: usize },

    /// The byte stream is not valid UTF-16.
    #[error("invalid UTF-16 text: {detail}")]
    InvalidEncoding { detail: String },

    #[error("line {line} has no '=' separator")]
    MissingSeparator { line: usize },
}

/// Localized text keyed by asset GUID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Localizations(HashMap<String, String>);

impl Localizations {
    /// Decode a UTF-16 byte stream and parse it.
    pub fn from_utf16_bytes(bytes: &[u8]) -> Result<Self, LocalizationError> {
        Self::parse_str(&decode_utf16(bytes)?)
    }

    /// Parse already-decoded text.
    ///
    /// Anything from the first `#` on a line is a comment. Lines empty after
    /// stripping the comment and trimming are skipped; every other line is
    /// split at its first `=`.
    pub fn parse_str(text: &str) -> Result<Self, LocalizationError> {
        let mut table = HashMap::new();
        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let content = match raw.find('#') {
                Some(at) => &raw[..at],
                None => raw,
            }
            .trim();
            if content.is_empty() {
                continue;
            }
            let (key, value) = content
                .split_once('=')
                .ok_or(LocalizationError::MissingSeparator { line })?;
            if table.contains_key(key) {
                return Err(LocalizationError::DuplicateKey {
                    key: key.to_string(),
                    line,
                });
            }
            table.insert(key.to_string(), value.to_string());
        }
        Ok(Self(table))
    }

    pub fn get(&self, guid: &str) -> Option<&str> {
        self.0.get(guid).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Decode UTF-16, honouring a byte-order mark and defaulting to big-endian.
fn decode_utf16(bytes: &[u8]) -> Result<String, LocalizationError> {
    let (body, little_endian) = match bytes {
        [0xFF, 0xFE, rest @ ..] => (rest, true),
        [0xFE, 0xFF, rest @ ..] => (rest, false),
        _ => (bytes, false),
    };
    if body.len() % 2 != 0 {
        return Err(LocalizationError::InvalidEncoding {
            detail: format!("odd byte count {}", body.len()),
        });
    }
    let units = body.chunks_exact(2).map(|pair| {
        let pair = [pair[0], pair[1]];
        if little_endian {
            u16::from_le_bytes(pair)
        } else {
            u16::from_be_bytes(pair)
        }
    });
    char::decode_utf16(units)
        .collect::<Result<String, _>>()
        .map_err(|e| LocalizationError::InvalidEncoding {
            detail: e.to_string(),
        })
}
